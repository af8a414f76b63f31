//! Domain records mirrored from the remote store.
//!
//! # Responsibility
//! - Define the row shapes shared by repositories and resource stores.
//! - Validate user input before it is sent to the remote store.
//!
//! # Invariants
//! - Identifiers and timestamps are assigned by the remote store, never here.
//! - Timestamps are Unix epoch milliseconds.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod join_request;
pub mod message;
pub mod profile;
pub mod project;
pub mod rating;
pub mod task;
pub mod team;

/// Input rejected before contacting the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trim.
    BlankField(&'static str),
    /// Rating score outside `MIN_SCORE..=MAX_SCORE`.
    ScoreOutOfRange(i64),
    /// Partial update that touches no column.
    NothingToUpdate,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} is required"),
            Self::ScoreOutOfRange(score) => write!(
                f,
                "rating must be between {} and {}, got {score}",
                rating::MIN_SCORE,
                rating::MAX_SCORE
            ),
            Self::NothingToUpdate => write!(f, "nothing to update"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

/// Maps `Some("")`/whitespace to `None` for optional free-text columns.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
