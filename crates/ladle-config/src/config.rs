//! User configuration.
//!
//! [`LadleConfig`] is extracted with figment from three layers, later ones
//! winning:
//!
//! 1. built-in defaults,
//! 2. `config.yaml` (see [`default_config_path`]; `LADLE_CONFIG` overrides),
//! 3. `LADLE_` prefixed environment variables, with `__` separating nested
//!    keys (`LADLE_WATCH__DEBOUNCE_MS=500`).
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer held a value of the wrong shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// No ladlefile was found from the starting directory upward.
    #[error("no ladlefile found in {} or any parent directory (looked for {names})", .start.display())]
    LadlefileNotFound { start: PathBuf, names: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// When to emit ANSI colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Colour when stderr/stdout is a terminal and the environment allows it.
    #[default]
    Auto,
    Always,
    Never,
}

/// `watch` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet period after the last event before rerunning.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Paths to watch, relative to the ladlefile directory. Empty means the
    /// ladlefile directory itself.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            paths: Vec::new(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    200
}

/// Layered user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LadleConfig {
    /// Shell program overriding the ladlefile's `set shell`.
    #[serde(default)]
    pub shell: Option<String>,

    /// Arguments placed between `shell` and the command line.
    #[serde(default)]
    pub shell_args: Vec<String>,

    /// Never echo command lines.
    #[serde(default)]
    pub quiet: bool,

    /// Echo command lines without running them.
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub color: ColorChoice,

    #[serde(default)]
    pub watch: WatchConfig,
}

const CONFIG_ENV: &str = "LADLE_CONFIG";
const ENV_PREFIX: &str = "LADLE_";

/// `$XDG_CONFIG_HOME/ladle/config.yaml`, falling back to
/// `$HOME/.config/ladle/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("ladle").join("config.yaml"))
}

/// Load configuration from defaults, the default config file and the
/// environment.
pub fn load_config() -> Result<LadleConfig> {
    let path = default_config_path();
    extract(layers(path.as_deref()).merge(Env::prefixed(ENV_PREFIX).split("__")))
}

/// Defaults plus an optional YAML file. A missing file contributes nothing.
fn layers(path: Option<&Path>) -> Figment {
    let figment = Figment::from(Serialized::defaults(LadleConfig::default()));
    match path {
        Some(path) => {
            debug!(path = %path.display(), exists = path.exists(), "config file");
            figment.merge(Yaml::file(path))
        }
        None => figment,
    }
}

fn extract(figment: Figment) -> Result<LadleConfig> {
    let config: LadleConfig = figment.extract()?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
