//! Client configuration from environment variables.
//!
//! | Variable            | Meaning                                  |
//! |---------------------|------------------------------------------|
//! | `TEAMHUB_DB_PATH`   | SQLite file; unset means in-memory       |
//! | `TEAMHUB_LOG_LEVEL` | log level; defaults per build mode       |
//! | `TEAMHUB_LOG_DIR`   | absolute log directory; unset disables   |

use crate::logging::{default_log_level, init_logging, LoggingError};
use crate::remote::{RemoteResult, SqliteRemoteStore};
use log::info;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "TEAMHUB_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "TEAMHUB_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "TEAMHUB_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();
        Self {
            db_path: read(DB_PATH_VAR).map(PathBuf::from),
            log_level: read(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns whether logging is active.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn open_remote(&self) -> RemoteResult<SqliteRemoteStore> {
        match &self.db_path {
            Some(path) => {
                info!(
                    "event=remote_open module=config status=start backend=sqlite path={}",
                    path.display()
                );
                SqliteRemoteStore::open(path)
            }
            None => {
                info!("event=remote_open module=config status=start backend=sqlite path=:memory:");
                SqliteRemoteStore::open_in_memory()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn reads_every_variable_and_ignores_blanks() {
        let config = ClientConfig::from_lookup(lookup(&[
            (DB_PATH_VAR, "/tmp/teamhub.db"),
            (LOG_LEVEL_VAR, " warn "),
            (LOG_DIR_VAR, "   "),
        ]));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/teamhub.db")));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn logging_stays_off_without_directory() {
        assert!(!ClientConfig::default().init_logging().unwrap());
    }

    #[test]
    fn opens_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            db_path: Some(dir.path().join("teamhub.db")),
            ..ClientConfig::default()
        };
        let remote = config.open_remote().unwrap();
        assert_eq!(remote.channel_count(), 0);
        assert!(dir.path().join("teamhub.db").exists());
    }
}
