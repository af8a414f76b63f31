//! Remote store contract and the bundled SQLite backend.
//!
//! # Responsibility
//! - Define the row-level query/insert/update/delete and subscribe contract
//!   every resource store talks to.
//! - Keep backend details (SQL, wire formats) behind `RemoteStore`.
//!
//! # Invariants
//! - Rows are JSON objects keyed by column name.
//! - Writes return the rows they produced so callers can merge immediately.
//! - Update and delete never run without at least one filter.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod channel;
pub mod query;
mod sqlite;

pub use channel::{
    ChangeEvent, ChangeKind, ChannelRegistry, ChannelSpec, EventMask, Subscription,
};
pub use query::{eq_filter, Direction, Filter, Order, Query, Table};
pub use sqlite::SqliteRemoteStore;

/// One remote row.
pub type Row = serde_json::Map<String, serde_json::Value>;

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug)]
pub enum RemoteError {
    UnknownColumn { table: Table, column: String },
    UnsupportedValue { column: String, detail: String },
    MissingFilter(Table),
    InvalidData(String),
    /// The backend refused the write, e.g. a constraint or policy
    /// violation. Backends map their own refusal codes onto this variant.
    Rejected(String),
    /// The backing database could not be opened or migrated.
    Db(DbError),
    /// A statement failed for a reason other than a refusal.
    Sqlite(rusqlite::Error),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` on table `{table}`")
            }
            Self::UnsupportedValue { column, detail } => {
                write!(f, "unsupported value for column `{column}`: {detail}")
            }
            Self::MissingFilter(table) => {
                write!(f, "refusing unfiltered write on table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid remote row data: {message}"),
            Self::Rejected(message) => write!(f, "remote store rejected request: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "query failed: {err}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RemoteError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Constraint violations become `Rejected`; everything else stays `Sqlite`.
impl From<rusqlite::Error> for RemoteError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Rejected(message.clone().unwrap_or_else(|| failure.to_string()))
            }
            _ => Self::Sqlite(value),
        }
    }
}

/// Hosted database contract: row CRUD plus per-table change channels.
pub trait RemoteStore {
    /// Runs `query` and returns matching rows in query order.
    fn select(&self, query: &Query) -> RemoteResult<Vec<Row>>;
    /// Inserts one row; the store assigns id and timestamp defaults.
    fn insert(&self, table: Table, row: Row) -> RemoteResult<Row>;
    /// Applies `patch` to every row matching `filters`.
    fn update(&self, table: Table, patch: Row, filters: &[Filter]) -> RemoteResult<Vec<Row>>;
    /// Removes every row matching `filters`.
    fn delete(&self, table: Table, filters: &[Filter]) -> RemoteResult<Vec<Row>>;
    /// Opens a change channel; dropping the handle closes it.
    fn subscribe(&self, spec: ChannelSpec) -> RemoteResult<Subscription>;
}
