//! Profile reads/writes and the profile join used by membership views.
//!
//! # Invariants
//! - `summaries_for` issues at most one `IN` query and none for an empty
//!   id list.
//! - `attach_profiles` never drops a row: unmatched references get
//!   `ProfileSummary::unknown()`.

use super::{decode_row, decode_rows, decode_updated, encode, id_value, RepoResult};
use crate::model::profile::{AccountId, NewProfile, Profile, ProfileSummary, ProfileUpdate};
use crate::remote::{eq_filter, Direction, Query, RemoteStore, Table};
use std::collections::{BTreeSet, HashMap};

pub struct ProfileRepository<'r> {
    remote: &'r dyn RemoteStore,
}

impl<'r> ProfileRepository<'r> {
    pub fn new(remote: &'r dyn RemoteStore) -> Self {
        Self { remote }
    }

    pub fn get(&self, id: AccountId) -> RepoResult<Option<Profile>> {
        let rows = self
            .remote
            .select(&Query::table(Table::Profiles).eq("id", id_value(id)))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(Table::Profiles, row))
            .transpose()
    }

    /// All profiles, newest first.
    pub fn list_all(&self) -> RepoResult<Vec<Profile>> {
        let rows = self.remote.select(
            &Query::table(Table::Profiles).order_by("created_at", Direction::Descending),
        )?;
        decode_rows(Table::Profiles, rows)
    }

    pub fn create_profile(&self, profile: &NewProfile) -> RepoResult<Profile> {
        let row = self
            .remote
            .insert(Table::Profiles, encode(Table::Profiles, profile)?)?;
        decode_row(Table::Profiles, row)
    }

    pub fn update(&self, id: AccountId, update: &ProfileUpdate) -> RepoResult<Profile> {
        let rows = self.remote.update(
            Table::Profiles,
            encode(Table::Profiles, update)?,
            &eq_filter("id", id_value(id)),
        )?;
        decode_updated(Table::Profiles, id, rows)
    }

    /// Resolves display summaries for `ids` with a single query.
    pub fn summaries_for(
        &self,
        ids: impl IntoIterator<Item = AccountId>,
    ) -> RepoResult<HashMap<AccountId, ProfileSummary>> {
        let unique: BTreeSet<AccountId> = ids.into_iter().collect();
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self.remote.select(
            &Query::table(Table::Profiles).is_in("id", unique.into_iter().map(id_value)),
        )?;
        let profiles: Vec<Profile> = decode_rows(Table::Profiles, rows)?;
        Ok(profiles
            .into_iter()
            .map(|profile| (profile.id, profile.summary()))
            .collect())
    }
}

/// Joins `items` to profile summaries by the account id `key` returns.
pub fn attach_profiles<T>(
    items: Vec<T>,
    key: impl Fn(&T) -> AccountId,
    profiles: &HashMap<AccountId, ProfileSummary>,
) -> Vec<(T, ProfileSummary)> {
    items
        .into_iter()
        .map(|item| {
            let profile = profiles
                .get(&key(&item))
                .cloned()
                .unwrap_or_else(ProfileSummary::unknown);
            (item, profile)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::attach_profiles;
    use crate::model::profile::ProfileSummary;
    use std::collections::HashMap;
    use uuid::Uuid;

    #[test]
    fn unmatched_references_get_unknown_placeholder() {
        let known = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let mut profiles = HashMap::new();
        profiles.insert(
            known,
            ProfileSummary {
                username: "ada".to_string(),
                avatar_url: None,
            },
        );

        let joined = attach_profiles(vec![known, missing], |id| *id, &profiles);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].1.username, "ada");
        assert!(joined[1].1.is_unknown());
    }
}
