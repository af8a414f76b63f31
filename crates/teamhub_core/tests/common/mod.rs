#![allow(dead_code)]

use std::cell::RefCell;
use teamhub_core::model::join_request::{JoinRequest, JoinRequestStatus, NewJoinRequest};
use teamhub_core::model::profile::{AccountId, NewProfile, Profile};
use teamhub_core::model::project::{Project, ProjectDraft, ProjectId};
use teamhub_core::model::task::{Task, TaskDraft};
use teamhub_core::model::team::{NewMembership, NewTeam, Team, TeamId, TeamMembership, TeamRole};
use teamhub_core::remote::{
    eq_filter, ChannelSpec, Filter, Query, RemoteError, RemoteResult, RemoteStore, Row, Subscription, Table,
};
use teamhub_core::repo::join_request_repo::JoinRequestRepository;
use teamhub_core::repo::profile_repo::ProfileRepository;
use teamhub_core::repo::project_repo::ProjectRepository;
use teamhub_core::repo::task_repo::TaskRepository;
use teamhub_core::repo::team_repo::TeamRepository;
use teamhub_core::{RecordingNotifier, Session, SqliteRemoteStore, StoreContext};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
    Subscribe,
}

/// In-memory remote that records every call and can fail chosen ones.
pub struct CountingRemote {
    inner: SqliteRemoteStore,
    calls: RefCell<Vec<(Op, Table)>>,
    faults: RefCell<Vec<(Op, Table)>>,
}

impl CountingRemote {
    pub fn new() -> Self {
        Self {
            inner: SqliteRemoteStore::open_in_memory().unwrap(),
            calls: RefCell::new(Vec::new()),
            faults: RefCell::new(Vec::new()),
        }
    }

    /// Uncounted access, used for seeding and simulating other clients.
    pub fn inner(&self) -> &SqliteRemoteStore {
        &self.inner
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Data calls only; channel subscriptions are not counted.
    pub fn data_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(op, _)| *op != Op::Subscribe)
            .count()
    }

    pub fn count(&self, op: Op, table: Table) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| **call == (op, table))
            .count()
    }

    pub fn writes(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(op, _)| matches!(op, Op::Insert | Op::Update | Op::Delete))
            .count()
    }

    pub fn reset_counts(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Makes the next `op` on `table` fail once.
    pub fn fail_next(&self, op: Op, table: Table) {
        self.faults.borrow_mut().push((op, table));
    }

    fn record(&self, op: Op, table: Table) -> RemoteResult<()> {
        self.calls.borrow_mut().push((op, table));
        let mut faults = self.faults.borrow_mut();
        if let Some(index) = faults.iter().position(|fault| *fault == (op, table)) {
            faults.remove(index);
            return Err(RemoteError::Rejected(format!("injected {op:?} fault on {table}")));
        }
        Ok(())
    }
}

impl RemoteStore for CountingRemote {
    fn select(&self, query: &Query) -> RemoteResult<Vec<Row>> {
        self.record(Op::Select, query.table)?;
        self.inner.select(query)
    }

    fn insert(&self, table: Table, row: Row) -> RemoteResult<Row> {
        self.record(Op::Insert, table)?;
        self.inner.insert(table, row)
    }

    fn update(&self, table: Table, patch: Row, filters: &[Filter]) -> RemoteResult<Vec<Row>> {
        self.record(Op::Update, table)?;
        self.inner.update(table, patch, filters)
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> RemoteResult<Vec<Row>> {
        self.record(Op::Delete, table)?;
        self.inner.delete(table, filters)
    }

    fn subscribe(&self, spec: ChannelSpec) -> RemoteResult<Subscription> {
        self.record(Op::Subscribe, spec.table)?;
        self.inner.subscribe(spec)
    }
}

pub fn context<'r>(
    remote: &'r CountingRemote,
    notifier: &'r RecordingNotifier,
    session: Session,
) -> StoreContext<'r> {
    StoreContext::new(remote, notifier, session)
}

pub fn seed_profile(remote: &dyn RemoteStore, username: &str) -> Profile {
    ProfileRepository::new(remote)
        .create_profile(&NewProfile::new(Uuid::new_v4(), username))
        .unwrap()
}

pub fn seed_team(remote: &dyn RemoteStore, name: &str) -> Team {
    TeamRepository::new(remote)
        .create_team(&NewTeam {
            name: name.to_string(),
            created_by: None,
        })
        .unwrap()
}

pub fn seed_member(remote: &dyn RemoteStore, team_id: TeamId, user_id: AccountId) -> TeamMembership {
    TeamRepository::new(remote)
        .add_member(&NewMembership {
            team_id,
            user_id,
            role: TeamRole::Member,
        })
        .unwrap()
}

pub fn seed_project(
    remote: &dyn RemoteStore,
    owner: AccountId,
    team_id: Option<TeamId>,
    name: &str,
) -> Project {
    let draft = ProjectDraft {
        team_id,
        ..ProjectDraft::new(name)
    };
    ProjectRepository::new(remote)
        .create(&draft.into_new_project(owner))
        .unwrap()
}

pub fn seed_task(remote: &dyn RemoteStore, creator: AccountId, title: &str) -> Task {
    TaskRepository::new(remote)
        .create(&TaskDraft::new(title).into_new_task(creator))
        .unwrap()
}

pub fn seed_join_request(
    remote: &dyn RemoteStore,
    project_id: ProjectId,
    user_id: AccountId,
) -> JoinRequest {
    JoinRequestRepository::new(remote)
        .create(&NewJoinRequest {
            project_id,
            user_id,
            status: JoinRequestStatus::Pending,
            message: None,
        })
        .unwrap()
}

pub fn move_project(remote: &dyn RemoteStore, project_id: ProjectId, team_id: TeamId) {
    let mut patch = Row::new();
    patch.insert("team_id".to_string(), team_id.to_string().into());
    let rows = remote
        .update(Table::Projects, patch, &eq_filter("id", project_id.to_string()))
        .unwrap();
    assert_eq!(rows.len(), 1);
}

pub fn request_status(remote: &dyn RemoteStore, request: &JoinRequest) -> JoinRequestStatus {
    JoinRequestRepository::new(remote)
        .get(request.id)
        .unwrap()
        .unwrap()
        .status
}
