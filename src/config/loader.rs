// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** validate the
/// values. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load the raw config at `path`, or built-in defaults if it does not exist.
///
/// A missing file is only tolerated when `required` is false; that is the
/// case for the implicit `HotReload.toml` lookup, not for `--config <PATH>`.
pub fn load_or_default(path: impl AsRef<Path>, required: bool) -> Result<RawConfigFile> {
    let path = path.as_ref();
    if !required && !path.exists() {
        debug!(?path, "no config file found; using built-in defaults");
        return Ok(RawConfigFile::default());
    }
    load_from_path(path)
}

/// Config file looked up in the current working directory when `--config`
/// is not given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("HotReload.toml")
}
