use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the assistant; `/ask` is appended when streaming
    pub endpoint: Option<String>,
    /// Directory holding `storage.json` (defaults to the platform data dir)
    pub data_dir: Option<PathBuf>,
}

/// Keys accepted by `hikmat set` / `hikmat unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Endpoint,
    DataDir,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 2] = [ConfigKey::Endpoint, ConfigKey::DataDir];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Endpoint => "endpoint",
            ConfigKey::DataDir => "data-dir",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }
}

impl Config {
    pub fn set(&mut self, key: ConfigKey, value: &str) {
        match key {
            ConfigKey::Endpoint => self.endpoint = Some(value.trim().to_string()),
            ConfigKey::DataDir => self.data_dir = Some(PathBuf::from(value.trim())),
        }
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Endpoint => self.endpoint = None,
            ConfigKey::DataDir => self.data_dir = None,
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts paths under `$HOME` to `~` notation on Unix-like systems
///
/// # Examples
/// - Unix: `/home/user/.local/share/hikmat/storage.json` → `~/.local/share/hikmat/storage.json`
/// - Windows: paths are shown unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
