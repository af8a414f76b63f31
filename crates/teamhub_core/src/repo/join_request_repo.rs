//! Join request reads and writes.

use super::profile_repo::{attach_profiles, ProfileRepository};
use super::{decode_row, decode_rows, decode_updated, encode, id_value, RepoResult};
use crate::model::join_request::{
    JoinRequest, JoinRequestId, JoinRequestStatus, JoinRequestWithProfile, NewJoinRequest,
};
use crate::model::project::ProjectId;
use crate::remote::{eq_filter, Direction, Query, RemoteStore, Table};
use serde_json::{json, Value};

pub struct JoinRequestRepository<'r> {
    remote: &'r dyn RemoteStore,
}

impl<'r> JoinRequestRepository<'r> {
    pub fn new(remote: &'r dyn RemoteStore) -> Self {
        Self { remote }
    }

    pub fn get(&self, id: JoinRequestId) -> RepoResult<Option<JoinRequest>> {
        let rows = self
            .remote
            .select(&Query::table(Table::ProjectJoinRequests).eq("id", id_value(id)))?;
        rows.into_iter()
            .next()
            .map(|row| decode_row(Table::ProjectJoinRequests, row))
            .transpose()
    }

    /// Pending requests for `project_id`, newest first, with requester
    /// profiles attached.
    ///
    /// Two queries: requests, then the referenced profiles.
    pub fn pending_with_profiles(
        &self,
        project_id: ProjectId,
    ) -> RepoResult<Vec<JoinRequestWithProfile>> {
        let rows = self.remote.select(
            &Query::table(Table::ProjectJoinRequests)
                .eq("project_id", id_value(project_id))
                .eq("status", status_value(JoinRequestStatus::Pending))
                .order_by("created_at", Direction::Descending),
        )?;
        let requests: Vec<JoinRequest> = decode_rows(Table::ProjectJoinRequests, rows)?;
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = ProfileRepository::new(self.remote)
            .summaries_for(requests.iter().map(|request| request.user_id))?;
        Ok(attach_profiles(requests, |request| request.user_id, &profiles)
            .into_iter()
            .map(|(request, profile)| JoinRequestWithProfile { request, profile })
            .collect())
    }

    pub fn create(&self, request: &NewJoinRequest) -> RepoResult<JoinRequest> {
        let row = self.remote.insert(
            Table::ProjectJoinRequests,
            encode(Table::ProjectJoinRequests, request)?,
        )?;
        decode_row(Table::ProjectJoinRequests, row)
    }

    /// Sets the status of exactly the request `id`.
    pub fn set_status(
        &self,
        id: JoinRequestId,
        status: JoinRequestStatus,
    ) -> RepoResult<JoinRequest> {
        let patch = encode(Table::ProjectJoinRequests, &json!({ "status": status }))?;
        let rows = self.remote.update(
            Table::ProjectJoinRequests,
            patch,
            &eq_filter("id", id_value(id)),
        )?;
        decode_updated(Table::ProjectJoinRequests, id, rows)
    }
}

fn status_value(status: JoinRequestStatus) -> Value {
    json!(status)
}
