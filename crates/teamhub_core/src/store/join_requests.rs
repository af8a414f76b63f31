//! Pending join requests of one project, and the approval flow.
//!
//! # Invariants
//! - The snapshot holds only `pending` requests of the selected project.
//! - Approval writes at most one membership per team/account and only ever
//!   updates the request it was given.
//! - Approval steps run in order and stop at the first failure; completed
//!   steps are not rolled back.

use super::{
    report_mutation, Mirror, Placement, Precondition, ResourceStore, StoreContext, StoreError,
    StoreResult,
};
use crate::model::join_request::{
    JoinRequest, JoinRequestId, JoinRequestStatus, JoinRequestWithProfile, NewJoinRequest,
};
use crate::model::non_blank;
use crate::model::profile::{AccountId, ProfileSummary};
use crate::model::project::ProjectId;
use crate::model::team::{NewMembership, TeamRole};
use crate::remote::{ChannelSpec, Table};
use crate::repo::id_value;
use crate::repo::join_request_repo::JoinRequestRepository;
use crate::repo::profile_repo::ProfileRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::team_repo::TeamRepository;
use log::{info, warn};

pub struct JoinRequestStore<'r> {
    ctx: StoreContext<'r>,
    project: Option<ProjectId>,
    mirror: Mirror<JoinRequestWithProfile>,
}

impl<'r> JoinRequestStore<'r> {
    pub fn new(ctx: StoreContext<'r>, project: Option<ProjectId>) -> Self {
        Self {
            ctx,
            project,
            mirror: Mirror::new(),
        }
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Switches the selected project and remounts when it changed.
    pub fn set_project(&mut self, project: Option<ProjectId>) -> StoreResult<()> {
        if self.project == project {
            return Ok(());
        }
        self.project = project;
        self.mount()
    }

    /// Whether the session account has a pending request in the snapshot.
    pub fn has_requested(&self) -> bool {
        match self.ctx.session.account_id() {
            Some(account) => self
                .mirror
                .find(|entry| entry.request.user_id == account)
                .is_some(),
            None => false,
        }
    }

    /// Asks to join the selected project's team.
    pub fn send_request(&mut self, message: Option<String>) -> StoreResult<JoinRequest> {
        let ctx = self.ctx;
        let project = self.project;
        let result = ctx.require_account().and_then(|requester| {
            let project_id = project.ok_or(Precondition::MissingFilter("project"))?;
            JoinRequestRepository::new(ctx.remote)
                .create(&NewJoinRequest {
                    project_id,
                    user_id: requester,
                    status: JoinRequestStatus::Pending,
                    message: non_blank(message),
                })
                .map_err(StoreError::Write)
        });
        let request =
            report_mutation(&ctx, "send_join_request", "Failed to send request", result)?;

        ctx.notifier.success("Join request sent!");
        let profile = self.requester_profile(request.user_id);
        let id = request.id;
        self.mirror.merge(
            JoinRequestWithProfile {
                request: request.clone(),
                profile,
            },
            Placement::Front,
            |existing| existing.request.id == id,
        );
        Ok(request)
    }

    /// Adds the requester to the project's team and marks the request
    /// approved.
    ///
    /// Retrying after a failed status update reuses the membership written
    /// by the first attempt.
    pub fn approve(
        &mut self,
        request_id: JoinRequestId,
        user_id: AccountId,
        project_id: ProjectId,
    ) -> StoreResult<JoinRequest> {
        let ctx = self.ctx;
        let result = ctx
            .require_account()
            .and_then(|_| approve_steps(&ctx, request_id, user_id, project_id));
        let request =
            report_mutation(&ctx, "approve_join_request", "Failed to approve request", result)?;

        ctx.notifier.success("Request approved successfully!");
        self.mirror.remove(|entry| entry.request.id == request_id);
        Ok(request)
    }

    pub fn reject(&mut self, request_id: JoinRequestId) -> StoreResult<JoinRequest> {
        let ctx = self.ctx;
        let result = ctx.require_account().and_then(|_| {
            JoinRequestRepository::new(ctx.remote)
                .set_status(request_id, JoinRequestStatus::Rejected)
                .map_err(StoreError::Write)
        });
        let request =
            report_mutation(&ctx, "reject_join_request", "Failed to reject request", result)?;

        ctx.notifier.success("Request rejected");
        self.mirror.remove(|entry| entry.request.id == request_id);
        Ok(request)
    }

    fn requester_profile(&self, account: AccountId) -> ProfileSummary {
        match ProfileRepository::new(self.ctx.remote).get(account) {
            Ok(Some(profile)) => profile.summary(),
            Ok(None) => ProfileSummary::unknown(),
            Err(err) => {
                warn!(
                    "event=profile_lookup module=store status=error account={account} error={err}"
                );
                ProfileSummary::unknown()
            }
        }
    }
}

fn approve_steps(
    ctx: &StoreContext<'_>,
    request_id: JoinRequestId,
    user_id: AccountId,
    project_id: ProjectId,
) -> StoreResult<JoinRequest> {
    let team_id = ProjectRepository::new(ctx.remote)
        .team_of(project_id)
        .map_err(StoreError::Read)?
        .ok_or(Precondition::ProjectHasNoTeam(project_id))?;

    let teams = TeamRepository::new(ctx.remote);
    let existing = teams
        .find_membership(team_id, user_id)
        .map_err(StoreError::Read)?;
    match existing {
        Some(membership) => info!(
            "event=join_request_approve module=store status=membership_exists request_id={request_id} membership_id={}",
            membership.id
        ),
        None => {
            let membership = teams
                .add_member(&NewMembership {
                    team_id,
                    user_id,
                    role: TeamRole::Member,
                })
                .map_err(StoreError::Write)?;
            info!(
                "event=join_request_approve module=store status=member_added request_id={request_id} membership_id={}",
                membership.id
            );
        }
    }

    JoinRequestRepository::new(ctx.remote)
        .set_status(request_id, JoinRequestStatus::Approved)
        .map_err(StoreError::Write)
}

impl<'r> ResourceStore<'r> for JoinRequestStore<'r> {
    type Item = JoinRequestWithProfile;

    const RESOURCE: &'static str = "join requests";

    fn context(&self) -> StoreContext<'r> {
        self.ctx
    }

    fn mirror(&self) -> &Mirror<JoinRequestWithProfile> {
        &self.mirror
    }

    fn mirror_mut(&mut self) -> &mut Mirror<JoinRequestWithProfile> {
        &mut self.mirror
    }

    fn load(&self) -> StoreResult<Option<Vec<JoinRequestWithProfile>>> {
        let Some(project) = self.project.filter(|_| self.ctx.session.is_authenticated()) else {
            return Ok(None);
        };
        JoinRequestRepository::new(self.ctx.remote)
            .pending_with_profiles(project)
            .map(Some)
            .map_err(StoreError::Read)
    }

    fn channels(&self) -> Vec<ChannelSpec> {
        match self.project.filter(|_| self.ctx.session.is_authenticated()) {
            Some(project) => vec![ChannelSpec::table(Table::ProjectJoinRequests)
                .filter_eq("project_id", id_value(project))],
            None => Vec::new(),
        }
    }
}
