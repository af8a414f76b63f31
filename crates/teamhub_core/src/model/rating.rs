//! Peer ratings. Append-only; averaged client-side per rated account.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::AccountId;
use super::project::ProjectId;
use super::{non_blank, ValidationError};

pub type RatingId = Uuid;

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub rater_id: AccountId,
    pub rated_user_id: AccountId,
    /// Serialized as `rating` to match the table column.
    #[serde(rename = "rating")]
    pub score: i64,
    pub comment: Option<String>,
    pub project_id: Option<ProjectId>,
    pub created_at: i64,
}

/// Form input for rating another account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingDraft {
    pub rated_user_id: AccountId,
    pub score: i64,
    pub comment: Option<String>,
    pub project_id: Option<ProjectId>,
}

impl RatingDraft {
    pub fn new(rated_user_id: AccountId, score: i64) -> Self {
        Self {
            rated_user_id,
            score,
            comment: None,
            project_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.score) {
            return Err(ValidationError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }

    pub fn into_new_rating(self, rater: AccountId) -> NewRating {
        NewRating {
            rater_id: rater,
            rated_user_id: self.rated_user_id,
            score: self.score,
            comment: non_blank(self.comment),
            project_id: self.project_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRating {
    pub rater_id: AccountId,
    pub rated_user_id: AccountId,
    #[serde(rename = "rating")]
    pub score: i64,
    pub comment: Option<String>,
    pub project_id: Option<ProjectId>,
}

/// Mean score of `ratings`; `0.0` for an empty slice.
pub fn average_score<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> f64 {
    let (sum, count) = ratings
        .into_iter()
        .fold((0i64, 0u32), |(sum, count), rating| {
            (sum + rating.score, count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    sum as f64 / f64::from(count)
}
