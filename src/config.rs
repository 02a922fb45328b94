use crate::error::{Result, TerminalError};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:3000";
pub const DEFAULT_FILES_KEY: &str = "BROWSER_TERMINAL_FILES";
pub const DEFAULT_CUSTOMIZATION_KEY: &str = "BROWSER_TERMINAL_CUSTOMIZATION";
pub const DEFAULT_THEME_KEY: &str = "BROWSER_TERMINAL_THEME";
pub const DEFAULT_RELAY_TIMEOUT_MS: u64 = 30_000;

/// where submitted lines go: the local interpreter or the remote relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TerminalMode {
    #[default]
    Client,
    Server,
}

impl fmt::Display for TerminalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalMode::Client => write!(f, "client"),
            TerminalMode::Server => write!(f, "server"),
        }
    }
}

impl FromStr for TerminalMode {
    type Err = TerminalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(TerminalMode::Client),
            "server" => Ok(TerminalMode::Server),
            other => Err(TerminalError::InvalidConfig(format!("unknown terminal mode '{}'", other))),
        }
    }
}

/// How `cd <name>` decides whether a target exists.
///
/// `RootOnly` checks the name against the root directory no matter where the
/// session currently is, and appends it to the current path. `Relative`
/// resolves the name against the current directory and understands `..`
/// and `~`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CdPolicy {
    #[default]
    RootOnly,
    Relative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerminalConfig {
    pub mode: TerminalMode,
    pub server_url: String,
    /// `None` waits forever for a server reply
    pub relay_timeout_ms: Option<u64>,
    pub cd_policy: CdPolicy,
    pub files_key: String,
    pub customization_key: String,
    pub theme_key: String,
    pub log_level: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            mode: TerminalMode::Client,
            server_url: DEFAULT_SERVER_URL.to_string(),
            relay_timeout_ms: Some(DEFAULT_RELAY_TIMEOUT_MS),
            cd_policy: CdPolicy::RootOnly,
            files_key: DEFAULT_FILES_KEY.to_string(),
            customization_key: DEFAULT_CUSTOMIZATION_KEY.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl TerminalConfig {
    /// parse + validate, missing keys fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TerminalConfig = serde_json::from_str(json)
            .map_err(|e| TerminalError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(TerminalError::InvalidConfig("serverUrl must not be empty".to_string()));
        }
        let keys = [&self.files_key, &self.customization_key, &self.theme_key];
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(TerminalError::InvalidConfig("storage keys must not be empty".to_string()));
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(TerminalError::InvalidConfig("storage keys must be distinct".to_string()));
        }
        if self.relay_timeout_ms == Some(0) {
            return Err(TerminalError::InvalidConfig("relayTimeoutMs must be positive or null".to_string()));
        }
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| TerminalError::InvalidConfig(format!("unknown log level '{}'", self.log_level)))?;
        Ok(())
    }

    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn relay_timeout(&self) -> Option<chrono::Duration> {
        self.relay_timeout_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .map(chrono::Duration::milliseconds)
    }
}
