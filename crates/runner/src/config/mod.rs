//! Configuration management for language runners.
//! This module handles parsing, environment overrides, and validation of the
//! ~/.config/stepwright/config.json configuration file.

mod io;
mod model;
mod validation;

pub use io::{apply_env_overrides, default_config_path, load_config, load_config_from_path};
pub use model::{ConfigError, RunnerCommand, RunnerConfig, TimeoutConfig};
pub use validation::{ValidationError, validate_config};
