//! Runtime settings
//!
//! Resolved once at startup from command-line flags, environment
//! variables and built-in defaults, in that order of precedence.

use std::env;
use std::path::PathBuf;
use tracing::debug;

use crate::constants::{config, env as env_vars, programs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding the mappings and current files
    pub state_dir: PathBuf,
    /// Layout utility used to query and apply layouts
    pub setxkbmap: String,
    /// Notification client used by `--notify`
    pub notify_send: String,
}

impl Settings {
    /// Resolve settings from the process environment
    pub fn resolve(config_dir: Option<PathBuf>) -> Self {
        Self::resolve_with(config_dir, |key| env::var(key).ok())
    }

    /// Resolve settings with a custom variable lookup
    ///
    /// Empty variables count as unset.
    pub fn resolve_with<F>(config_dir: Option<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let state_dir = config_dir
            .or_else(|| lookup(env_vars::CONFIG_DIR).map(PathBuf::from))
            .unwrap_or_else(Self::default_state_dir);

        let settings = Self {
            state_dir,
            setxkbmap: lookup(env_vars::SETXKBMAP).unwrap_or_else(|| programs::SETXKBMAP.to_string()),
            notify_send: lookup(env_vars::NOTIFY_SEND).unwrap_or_else(|| programs::NOTIFY_SEND.to_string()),
        };
        debug!(settings = ?settings, "Resolved settings");
        settings
    }

    /// `$XDG_CONFIG_HOME/keyboard-switch`, or `./keyboard-switch` without a config dir
    pub fn default_state_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path
    }
}
