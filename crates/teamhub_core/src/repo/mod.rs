//! Typed repositories over the remote store.
//!
//! # Responsibility
//! - Encode domain payloads into rows and decode rows into domain records.
//! - Own multi-query reads that join rows client-side (profiles attached to
//!   memberships and join requests).
//!
//! # Invariants
//! - Every read returns rows in the order the remote store produced.
//! - Update paths that match no row report `NotFound` instead of succeeding
//!   silently.

use crate::remote::{RemoteError, Row, Table};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod join_request_repo;
pub mod message_repo;
pub mod profile_repo;
pub mod project_repo;
pub mod rating_repo;
pub mod task_repo;
pub mod team_repo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Remote(RemoteError),
    Decode { table: Table, message: String },
    NotFound { table: Table, id: Uuid },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::Decode { table, message } => {
                write!(f, "invalid row in `{table}`: {message}")
            }
            Self::NotFound { table, id } => write!(f, "row not found in `{table}`: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Decode { .. } | Self::NotFound { .. } => None,
        }
    }
}

impl From<RemoteError> for RepoError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

pub(crate) fn id_value(id: Uuid) -> Value {
    Value::String(id.to_string())
}

pub(crate) fn encode<T: Serialize>(table: Table, value: &T) -> RepoResult<Row> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(RepoError::Decode {
            table,
            message: format!("payload is not an object: {other}"),
        }),
        Err(err) => Err(RepoError::Decode {
            table,
            message: err.to_string(),
        }),
    }
}

pub(crate) fn decode_row<T: DeserializeOwned>(table: Table, row: Row) -> RepoResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|err| RepoError::Decode {
        table,
        message: err.to_string(),
    })
}

pub(crate) fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Row>) -> RepoResult<Vec<T>> {
    rows.into_iter().map(|row| decode_row(table, row)).collect()
}

/// Decodes the single row an update by id produced.
pub(crate) fn decode_updated<T: DeserializeOwned>(
    table: Table,
    id: Uuid,
    rows: Vec<Row>,
) -> RepoResult<T> {
    match rows.into_iter().next() {
        Some(row) => decode_row(table, row),
        None => Err(RepoError::NotFound { table, id }),
    }
}
