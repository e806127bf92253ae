//! Configuration loading and parsing.
//!
//! Parses `multiyank.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [registers]
//! default = "\""
//!
//! [yank]
//! exclude_empty_caret_ranges = true
//! ```
//!
//! Unknown fields are ignored so the file can evolve ahead of the binary. A missing
//! file or a parse error falls back to defaults; the parse error is logged.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

mod session;
pub use session::{
    SESSION_FILE_NAME, SessionError, SessionState, discover_session, load_session, save_session,
};

pub const CONFIG_FILE_NAME: &str = "multiyank.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RegistersConfig {
    /// Register receiving commits when no register was selected.
    #[serde(default = "RegistersConfig::default_register")]
    pub default: char,
}

impl Default for RegistersConfig {
    fn default() -> Self {
        Self {
            default: Self::default_register(),
        }
    }
}

impl RegistersConfig {
    const fn default_register() -> char {
        '"'
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct YankConfig {
    /// Drop per-caret motion results of zero length before aggregation.
    #[serde(default = "YankConfig::default_exclude_empty")]
    pub exclude_empty_caret_ranges: bool,
}

impl Default for YankConfig {
    fn default() -> Self {
        Self {
            exclude_empty_caret_ranges: Self::default_exclude_empty(),
        }
    }
}

impl YankConfig {
    const fn default_exclude_empty() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub registers: RegistersConfig,
    #[serde(default)]
    pub yank: YankConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Best-effort config path: local working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("multiyank").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                default_register = %file.registers.default,
                exclude_empty_caret_ranges = file.yank.exclude_empty_caret_ranges,
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                path: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}
