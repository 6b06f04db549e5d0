//! Configuration for ladle.
//!
//! This crate finds the ladlefile to load by walking up from the working
//! directory, and layers user settings from built-in defaults, an optional
//! `config.yaml` and `LADLE_*` environment variables.

pub mod config;
pub mod ladlefile;

pub use config::{ColorChoice, ConfigError, LadleConfig, WatchConfig, load_config};
pub use ladlefile::{LADLEFILE_NAMES, find_ladlefile, find_ladlefile_or_error};
