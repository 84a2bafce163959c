// src/config/mod.rs

//! Configuration loading and validation for hotreload.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate and normalise it into a `ConfigFile` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, RawConfigFile, ServiceConfig, ServiceSection, TimingSection, Timings,
    WatchConfig, WatchSection,
};
pub use validate::parse_duration;
