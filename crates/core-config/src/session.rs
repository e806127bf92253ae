//! Persisted session flags.
//!
//! One struct of named fields. Serialization goes through the static `FLAG_FIELDS` /
//! `TEXT_FIELDS` tables, so the on-disk key of every field is spelled out in one place:
//!
//! ```toml
//! [notifications.join-notified]
//! enabled = true
//!
//! [notifications.first-version]
//! value = "0.0.1"
//! ```
//!
//! Unknown keys are ignored; a known key holding the wrong type is an error.

use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::{Table, Value};
use tracing::debug;

pub const SESSION_FILE_NAME: &str = "multiyank-session.toml";
const NOTIFICATIONS: &str = "notifications";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to parse session file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize session state: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("session key {key:?} must hold a {expected}")]
    InvalidField {
        key: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub join_notified: bool,
    pub put_notified: bool,
    pub eap_auto_subscribed: bool,
    /// First version that wrote this file, `"-1"` until recorded.
    pub first_version: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            join_notified: false,
            put_notified: false,
            eap_auto_subscribed: false,
            first_version: "-1".to_string(),
        }
    }
}

struct FlagField {
    key: &'static str,
    get: fn(&SessionState) -> bool,
    set: fn(&mut SessionState, bool),
}

struct TextField {
    key: &'static str,
    get: fn(&SessionState) -> &str,
    set: fn(&mut SessionState, String),
}

const FLAG_FIELDS: &[FlagField] = &[
    FlagField {
        key: "join-notified",
        get: |s| s.join_notified,
        set: |s, v| s.join_notified = v,
    },
    FlagField {
        key: "put-notified",
        get: |s| s.put_notified,
        set: |s, v| s.put_notified = v,
    },
    FlagField {
        key: "was-automatically-subscribed-to-eap",
        get: |s| s.eap_auto_subscribed,
        set: |s, v| s.eap_auto_subscribed = v,
    },
];

const TEXT_FIELDS: &[TextField] = &[TextField {
    key: "first-version",
    get: |s| s.first_version.as_str(),
    set: |s, v| s.first_version = v,
}];

impl SessionState {
    /// Record `version` as the first version unless one is already recorded.
    /// Returns true when the state changed.
    pub fn record_first_version(&mut self, version: &str) -> bool {
        if self.first_version == "-1" {
            self.first_version = version.to_string();
            true
        } else {
            false
        }
    }

    pub fn to_toml(&self) -> Result<String, SessionError> {
        let mut notifications = Table::new();
        for field in FLAG_FIELDS {
            let mut child = Table::new();
            child.insert("enabled".into(), Value::Boolean((field.get)(self)));
            notifications.insert(field.key.into(), Value::Table(child));
        }
        for field in TEXT_FIELDS {
            let mut child = Table::new();
            child.insert("value".into(), Value::String((field.get)(self).to_string()));
            notifications.insert(field.key.into(), Value::Table(child));
        }
        let mut root = Table::new();
        root.insert(NOTIFICATIONS.into(), Value::Table(notifications));
        Ok(toml::to_string(&root)?)
    }

    pub fn from_toml(content: &str) -> Result<Self, SessionError> {
        let root: Table = toml::from_str(content)?;
        let mut state = SessionState::default();
        let Some(Value::Table(notifications)) = root.get(NOTIFICATIONS) else {
            return Ok(state);
        };
        for field in FLAG_FIELDS {
            match notifications.get(field.key).and_then(|c| c.get("enabled")) {
                Some(Value::Boolean(v)) => (field.set)(&mut state, *v),
                Some(_) => {
                    return Err(SessionError::InvalidField {
                        key: field.key,
                        expected: "boolean",
                    });
                }
                None => {}
            }
        }
        for field in TEXT_FIELDS {
            match notifications.get(field.key).and_then(|c| c.get("value")) {
                Some(Value::String(v)) => (field.set)(&mut state, v.clone()),
                Some(_) => {
                    return Err(SessionError::InvalidField {
                        key: field.key,
                        expected: "string",
                    });
                }
                None => {}
            }
        }
        Ok(state)
    }
}

/// Session file location: platform local data dir, falling back to the working directory.
pub fn discover_session() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("multiyank").join(SESSION_FILE_NAME),
        None => PathBuf::from(SESSION_FILE_NAME),
    }
}

/// Load session state; a missing file yields defaults.
pub fn load_session(path: &Path) -> Result<SessionState, SessionError> {
    if !path.exists() {
        debug!(target: "config", path = %path.display(), "session_missing_using_defaults");
        return Ok(SessionState::default());
    }
    let content = std::fs::read_to_string(path)?;
    SessionState::from_toml(&content)
}

pub fn save_session(path: &Path, state: &SessionState) -> Result<(), SessionError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, state.to_toml()?)?;
    debug!(target: "config", path = %path.display(), "session_saved");
    Ok(())
}
