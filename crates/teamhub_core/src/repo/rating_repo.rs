//! Rating reads and appends.

use super::{decode_row, decode_rows, encode, RepoResult};
use crate::model::rating::{NewRating, Rating};
use crate::remote::{Direction, Query, RemoteStore, Table};

pub struct RatingRepository<'r> {
    remote: &'r dyn RemoteStore,
}

impl<'r> RatingRepository<'r> {
    pub fn new(remote: &'r dyn RemoteStore) -> Self {
        Self { remote }
    }

    /// All ratings, newest first.
    pub fn list_all(&self) -> RepoResult<Vec<Rating>> {
        let rows = self
            .remote
            .select(&Query::table(Table::Ratings).order_by("created_at", Direction::Descending))?;
        decode_rows(Table::Ratings, rows)
    }

    pub fn create(&self, rating: &NewRating) -> RepoResult<Rating> {
        let row = self
            .remote
            .insert(Table::Ratings, encode(Table::Ratings, rating)?)?;
        decode_row(Table::Ratings, row)
    }
}
