pub mod file_io;
pub mod path_processing;
pub mod project;

pub use file_io::save_file;
pub use path_processing::{display_relative, expand_tilde};
pub use project::{MANIFEST_FILE, PROJECT_ROOT_ENV, ProjectRootError, find_project_root, find_project_root_from};
