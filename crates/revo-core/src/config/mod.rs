//! Configuration management

pub mod env_loader;
pub mod file_loader;
pub mod model;
pub mod timeouts;

pub use env_loader::{apply_env_with, apply_process_env};
pub use file_loader::load_from_file;
pub use model::{GitHubConfig, HandoffConfig, RevoConfig, SamplingConfig};

use crate::error::RevoResult;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "revo.toml";

/// Default location of the user configuration file (`<config dir>/revo/revo.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("revo").join(DEFAULT_CONFIG_FILE))
}

/// Load configuration: file (explicit path or the default location), then
/// environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> RevoResult<RevoConfig> {
    let mut config = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => load_from_file(&path)?,
        None => RevoConfig::default(),
    };
    apply_process_env(&mut config)?;
    config.validate()?;
    Ok(config)
}
