//! SQLite bootstrap for the bundled remote-store backend.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing `SqliteRemoteStore`.
//! - Apply the collaboration schema before any row is read or written.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A database written by a newer binary is rejected, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while preparing a database, tagged with the stage that failed.
#[derive(Debug)]
pub enum DbError {
    /// The file or in-memory handle could not be opened.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// Connection pragmas or schema bookkeeping failed.
    Configure(rusqlite::Error),
    /// Migration `version` failed; the batch was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Underlying SQLite error, if the failure came from SQLite.
    pub fn sqlite(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Configure(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => write!(f, "cannot open {mode} database: {source}"),
            Self::Configure(source) => write!(f, "cannot configure database: {source}"),
            Self::Migration { version, source } => {
                write!(f, "migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.sqlite().map(|err| err as &(dyn Error + 'static))
    }
}
