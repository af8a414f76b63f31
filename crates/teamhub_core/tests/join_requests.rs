mod common;

use common::{
    context, move_project, request_status, seed_join_request, seed_member, seed_profile, seed_project,
    seed_team, CountingRemote, Op,
};
use teamhub_core::model::join_request::JoinRequestStatus;
use teamhub_core::model::team::TeamRole;
use teamhub_core::remote::Table;
use teamhub_core::repo::team_repo::TeamRepository;
use teamhub_core::{
    JoinRequestStore, Precondition, ProjectMemberStore, RecordingNotifier, ResourceStore,
    Session, StoreError,
};
use uuid::Uuid;

#[test]
fn pending_requests_carry_requester_profiles() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = seed_profile(remote.inner(), "owner");
    let ada = seed_profile(remote.inner(), "ada");
    let team = seed_team(remote.inner(), "core");
    let project = seed_project(remote.inner(), owner.id, Some(team.id), "Atlas");
    seed_join_request(remote.inner(), project.id, ada.id);
    let ghost = seed_join_request(remote.inner(), project.id, Uuid::new_v4());

    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(owner.id)),
        Some(project.id),
    );
    requests.mount().unwrap();

    assert_eq!(requests.items().len(), 2);
    assert_eq!(requests.items()[0].request.id, ghost.id);
    assert!(requests.items()[0].profile.is_unknown());
    assert_eq!(requests.items()[0].profile.username, "Unknown");
    assert_eq!(requests.items()[1].profile.username, "ada");
    assert_eq!(remote.count(Op::Select, Table::Profiles), 1);
}

#[test]
fn approval_adds_membership_and_marks_request() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = Uuid::new_v4();
    let requester = Uuid::new_v4();
    let team = seed_team(remote.inner(), "core");
    let project = seed_project(remote.inner(), owner, Some(team.id), "Atlas");
    let request = seed_join_request(remote.inner(), project.id, requester);

    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(owner)),
        Some(project.id),
    );
    requests.mount().unwrap();

    let approved = requests
        .approve(request.id, requester, project.id)
        .unwrap();

    assert_eq!(approved.status, JoinRequestStatus::Approved);
    assert!(requests.items().is_empty());
    let membership = TeamRepository::new(remote.inner())
        .find_membership(team.id, requester)
        .unwrap()
        .unwrap();
    assert_eq!(membership.role, TeamRole::Member);
    assert_eq!(
        notifier.successes(),
        vec!["Request approved successfully!".to_string()]
    );
}

#[test]
fn approval_without_team_fails_and_writes_nothing() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = Uuid::new_v4();
    let requester = Uuid::new_v4();
    let project = seed_project(remote.inner(), owner, None, "Solo");
    let request = seed_join_request(remote.inner(), project.id, requester);

    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(owner)),
        Some(project.id),
    );
    requests.mount().unwrap();

    let err = requests
        .approve(request.id, requester, project.id)
        .unwrap_err();

    assert_eq!(
        err.precondition(),
        Some(&Precondition::ProjectHasNoTeam(project.id))
    );
    assert_eq!(err.to_string(), "project has no team");
    assert_eq!(remote.writes(), 0);
    assert_eq!(request_status(remote.inner(), &request), JoinRequestStatus::Pending);
    assert_eq!(requests.items().len(), 1);
    assert_eq!(
        notifier.errors(),
        vec!["Failed to approve request: project has no team".to_string()]
    );
}

#[test]
fn approving_one_request_leaves_a_sibling_untouched() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = Uuid::new_v4();
    let requester = Uuid::new_v4();
    let team = seed_team(remote.inner(), "core");
    let project = seed_project(remote.inner(), owner, Some(team.id), "Atlas");
    let first = seed_join_request(remote.inner(), project.id, requester);
    let second = seed_join_request(remote.inner(), project.id, requester);

    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(owner)),
        Some(project.id),
    );
    requests.mount().unwrap();
    requests.approve(first.id, requester, project.id).unwrap();

    assert_eq!(request_status(remote.inner(), &first), JoinRequestStatus::Approved);
    assert_eq!(request_status(remote.inner(), &second), JoinRequestStatus::Pending);
    assert_eq!(requests.items().len(), 1);
    assert_eq!(requests.items()[0].request.id, second.id);
}

#[test]
fn retry_after_failed_status_update_reuses_membership() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = Uuid::new_v4();
    let requester = Uuid::new_v4();
    let team = seed_team(remote.inner(), "core");
    let project = seed_project(remote.inner(), owner, Some(team.id), "Atlas");
    let request = seed_join_request(remote.inner(), project.id, requester);

    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(owner)),
        Some(project.id),
    );
    requests.mount().unwrap();

    remote.fail_next(Op::Update, Table::ProjectJoinRequests);
    let err = requests
        .approve(request.id, requester, project.id)
        .unwrap_err();
    assert!(matches!(err, StoreError::Write(_)));
    assert_eq!(request_status(remote.inner(), &request), JoinRequestStatus::Pending);
    assert_eq!(remote.count(Op::Insert, Table::TeamMembers), 1);
    assert_eq!(requests.items().len(), 1);

    requests
        .approve(request.id, requester, project.id)
        .unwrap();
    assert_eq!(remote.count(Op::Insert, Table::TeamMembers), 1);
    assert_eq!(request_status(remote.inner(), &request), JoinRequestStatus::Approved);
    assert_eq!(
        TeamRepository::new(remote.inner())
            .members_of(team.id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn failed_membership_insert_leaves_request_pending() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = Uuid::new_v4();
    let requester = Uuid::new_v4();
    let team = seed_team(remote.inner(), "core");
    let project = seed_project(remote.inner(), owner, Some(team.id), "Atlas");
    let request = seed_join_request(remote.inner(), project.id, requester);

    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(owner)),
        Some(project.id),
    );
    remote.fail_next(Op::Insert, Table::TeamMembers);

    assert!(requests.approve(request.id, requester, project.id).is_err());
    assert_eq!(remote.count(Op::Update, Table::ProjectJoinRequests), 0);
    assert_eq!(request_status(remote.inner(), &request), JoinRequestStatus::Pending);
}

#[test]
fn reject_only_touches_the_given_request() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = Uuid::new_v4();
    let project = seed_project(remote.inner(), owner, None, "Solo");
    let rejected = seed_join_request(remote.inner(), project.id, Uuid::new_v4());
    let kept = seed_join_request(remote.inner(), project.id, Uuid::new_v4());

    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(owner)),
        Some(project.id),
    );
    requests.mount().unwrap();
    requests.reject(rejected.id).unwrap();

    assert_eq!(request_status(remote.inner(), &rejected), JoinRequestStatus::Rejected);
    assert_eq!(request_status(remote.inner(), &kept), JoinRequestStatus::Pending);
    assert_eq!(requests.items().len(), 1);
    assert_eq!(notifier.successes(), vec!["Request rejected".to_string()]);
}

#[test]
fn requester_sees_own_pending_request() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let me = seed_profile(remote.inner(), "ada");
    let project = seed_project(remote.inner(), Uuid::new_v4(), None, "Atlas");

    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(me.id)),
        Some(project.id),
    );
    requests.mount().unwrap();
    assert!(!requests.has_requested());

    let sent = requests
        .send_request(Some("let me in".to_string()))
        .unwrap();
    assert_eq!(sent.status, JoinRequestStatus::Pending);
    assert_eq!(sent.message.as_deref(), Some("let me in"));
    assert!(requests.has_requested());
    assert_eq!(requests.items()[0].profile.username, "ada");
    assert_eq!(notifier.successes(), vec!["Join request sent!".to_string()]);
}

#[test]
fn sending_a_request_needs_a_selected_project() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let mut requests = JoinRequestStore::new(
        context(&remote, &notifier, Session::authenticated(Uuid::new_v4())),
        None,
    );

    let err = requests.send_request(None).unwrap_err();
    assert_eq!(err.precondition(), Some(&Precondition::MissingFilter("project")));
    assert_eq!(remote.total_calls(), 0);
}

#[test]
fn project_members_follow_team_membership() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = seed_profile(remote.inner(), "owner");
    let team = seed_team(remote.inner(), "core");
    seed_member(remote.inner(), team.id, owner.id);
    let project = seed_project(remote.inner(), owner.id, Some(team.id), "Atlas");
    let solo = seed_project(remote.inner(), owner.id, None, "Solo");

    let mut members = ProjectMemberStore::new(
        context(&remote, &notifier, Session::authenticated(owner.id)),
        Some(project.id),
    );
    members.mount().unwrap();
    assert_eq!(members.items().len(), 1);
    assert_eq!(members.items()[0].profile.username, "owner");

    seed_member(remote.inner(), team.id, Uuid::new_v4());
    assert_eq!(members.process_notifications(), 1);
    assert_eq!(members.items().len(), 2);
    assert!(members.items()[1].profile.is_unknown());

    remote.reset_counts();
    members.set_project(Some(solo.id)).unwrap();
    assert!(members.items().is_empty());
    assert_eq!(remote.count(Op::Select, Table::TeamMembers), 0);
}

#[test]
fn project_members_ignore_other_teams() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = seed_profile(remote.inner(), "owner");
    let team = seed_team(remote.inner(), "core");
    let elsewhere = seed_team(remote.inner(), "elsewhere");
    seed_member(remote.inner(), team.id, owner.id);
    let project = seed_project(remote.inner(), owner.id, Some(team.id), "Atlas");

    let mut members = ProjectMemberStore::new(
        context(&remote, &notifier, Session::authenticated(owner.id)),
        Some(project.id),
    );
    members.mount().unwrap();
    assert_eq!(members.team(), Some(team.id));

    remote.reset_counts();
    seed_member(remote.inner(), elsewhere.id, Uuid::new_v4());
    assert_eq!(members.process_notifications(), 0);
    assert_eq!(remote.count(Op::Select, Table::TeamMembers), 0);
    assert_eq!(members.items().len(), 1);
}

#[test]
fn project_members_follow_a_team_reassignment() {
    let remote = CountingRemote::new();
    let notifier = RecordingNotifier::new();
    let owner = seed_profile(remote.inner(), "owner");
    let first = seed_team(remote.inner(), "first");
    let second = seed_team(remote.inner(), "second");
    seed_member(remote.inner(), first.id, owner.id);
    seed_member(remote.inner(), second.id, Uuid::new_v4());
    seed_member(remote.inner(), second.id, Uuid::new_v4());
    let project = seed_project(remote.inner(), owner.id, Some(first.id), "Atlas");

    let mut members = ProjectMemberStore::new(
        context(&remote, &notifier, Session::authenticated(owner.id)),
        Some(project.id),
    );
    members.mount().unwrap();
    assert_eq!(members.items().len(), 1);

    move_project(remote.inner(), project.id, second.id);
    assert_eq!(members.process_notifications(), 1);
    assert_eq!(members.team(), Some(second.id));
    assert_eq!(members.items().len(), 2);

    seed_member(remote.inner(), first.id, Uuid::new_v4());
    assert_eq!(members.process_notifications(), 0);

    seed_member(remote.inner(), second.id, Uuid::new_v4());
    assert_eq!(members.process_notifications(), 1);
    assert_eq!(members.items().len(), 3);
}
