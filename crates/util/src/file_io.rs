use std::fs::{create_dir_all, write};
use std::io;
use std::path::Path;

/// Write `contents` to `path`, creating parent directories.
///
/// When `overwrite` is false an existing file is left alone and an
/// `AlreadyExists` error is returned.
pub fn save_file(path: &Path, contents: &str, overwrite: bool) -> io::Result<()> {
    if !overwrite && path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }
    if let Some(parent_directory) = path.parent()
        && !parent_directory.as_os_str().is_empty()
    {
        create_dir_all(parent_directory)?;
    }
    write(path, contents)
}
