//! Resource stores: local mirrors of remote collections.
//!
//! # Responsibility
//! - Keep one read-only snapshot per remote collection, scoped by the
//!   session account and an optional filter parameter.
//! - Refetch the whole collection once per change notification.
//! - Write through to the remote store and merge the written row locally.
//!
//! # Invariants
//! - The remote store is the only source of truth; a snapshot is replaced
//!   wholesale on every successful fetch, order preserved.
//! - An inactive store (anonymous session or absent filter) holds no items
//!   and issues no remote call.
//! - Every failure is logged and turned into an operator notice; nothing is
//!   retried automatically.

use crate::model::profile::AccountId;
use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use crate::model::ValidationError;
use crate::notify::Notifier;
use crate::remote::{ChannelSpec, RemoteError, RemoteStore, Subscription};
use crate::repo::RepoError;
use crate::session::Session;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub mod join_requests;
pub mod messages;
pub mod own_profile;
pub mod profile_directory;
pub mod project_members;
pub mod projects;
pub mod ratings;
pub mod tasks;

pub type StoreResult<T> = Result<T, StoreError>;

/// Condition checked before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    NotAuthenticated,
    Invalid(ValidationError),
    /// The store has no filter parameter the operation needs.
    MissingFilter(&'static str),
    UnknownTask(TaskId),
    UnknownProject(ProjectId),
    ProjectHasNoTeam(ProjectId),
}

impl Display for Precondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "you must be logged in"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::MissingFilter(name) => write!(f, "no {name} selected"),
            Self::UnknownTask(id) => write!(f, "task not found: {id}"),
            Self::UnknownProject(id) => write!(f, "project not found: {id}"),
            Self::ProjectHasNoTeam(_) => write!(f, "project has no team"),
        }
    }
}

/// Store failure, split by where it happened.
#[derive(Debug)]
pub enum StoreError {
    /// Short-circuited before contacting the remote store.
    Precondition(Precondition),
    /// A query was rejected; the snapshot is left as it was.
    Read(RepoError),
    /// A mutation was rejected; nothing changed locally.
    Write(RepoError),
}

impl StoreError {
    pub fn precondition(&self) -> Option<&Precondition> {
        match self {
            Self::Precondition(precondition) => Some(precondition),
            Self::Read(_) | Self::Write(_) => None,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Precondition(precondition) => write!(f, "{precondition}"),
            Self::Read(err) => write!(f, "read failed: {err}"),
            Self::Write(err) => write!(f, "write failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Precondition(Precondition::Invalid(err)) => Some(err),
            Self::Precondition(_) => None,
            Self::Read(err) | Self::Write(err) => Some(err),
        }
    }
}

impl From<Precondition> for StoreError {
    fn from(value: Precondition) -> Self {
        Self::Precondition(value)
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Precondition(Precondition::Invalid(value))
    }
}

/// Collaborators injected into every store.
#[derive(Clone, Copy)]
pub struct StoreContext<'r> {
    pub remote: &'r dyn RemoteStore,
    pub notifier: &'r dyn Notifier,
    pub session: Session,
}

impl<'r> StoreContext<'r> {
    pub fn new(remote: &'r dyn RemoteStore, notifier: &'r dyn Notifier, session: Session) -> Self {
        Self {
            remote,
            notifier,
            session,
        }
    }

    pub fn require_account(&self) -> StoreResult<AccountId> {
        self.session
            .account_id()
            .ok_or(StoreError::Precondition(Precondition::NotAuthenticated))
    }
}

/// Lifecycle of a store's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    /// First fetch outstanding.
    Loading,
    Ready,
}

/// Where a merged row lands when it is not already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Front,
    Back,
}

/// Snapshot plus the channels that keep it fresh.
#[derive(Debug)]
pub struct Mirror<T> {
    items: Vec<T>,
    state: LoadState,
    subscriptions: Vec<Subscription>,
}

impl<T> Default for Mirror<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Uninitialized,
            subscriptions: Vec::new(),
        }
    }
}

impl<T> Mirror<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn channel_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn begin_initial_load(&mut self) {
        if self.state == LoadState::Uninitialized {
            self.state = LoadState::Loading;
        }
    }

    fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.state = LoadState::Ready;
    }

    fn clear(&mut self) {
        self.items.clear();
        self.state = LoadState::Ready;
    }

    fn settle(&mut self) {
        if self.state == LoadState::Loading {
            self.state = LoadState::Ready;
        }
    }

    fn attach(&mut self, subscriptions: Vec<Subscription>) {
        self.subscriptions = subscriptions;
    }

    fn teardown(&mut self) {
        self.subscriptions.clear();
    }

    fn drain_notifications(&mut self) -> usize {
        self.subscriptions
            .iter()
            .map(|subscription| subscription.drain().len())
            .sum()
    }

    pub(crate) fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| predicate(item))
    }

    /// Replaces the item `same` selects, or inserts `item` at `placement`.
    pub(crate) fn merge(&mut self, item: T, placement: Placement, same: impl Fn(&T) -> bool) {
        match self.items.iter().position(|existing| same(existing)) {
            Some(index) => self.items[index] = item,
            None => match placement {
                Placement::Front => self.items.insert(0, item),
                Placement::Back => self.items.push(item),
            },
        }
    }

    pub(crate) fn remove(&mut self, predicate: impl Fn(&T) -> bool) {
        self.items.retain(|item| !predicate(item));
    }
}

/// Contract shared by every resource store.
///
/// Implementors supply the query and channel set for their current
/// parameters; mounting, refreshing and notification handling are shared.
pub trait ResourceStore<'r> {
    type Item;

    /// Plural noun used in notices and log events.
    const RESOURCE: &'static str;

    fn context(&self) -> StoreContext<'r>;
    fn mirror(&self) -> &Mirror<Self::Item>;
    fn mirror_mut(&mut self) -> &mut Mirror<Self::Item>;

    /// Reads the collection for the current parameters.
    ///
    /// Returns `Ok(None)` without touching the remote store when the store
    /// is inactive.
    fn load(&self) -> StoreResult<Option<Vec<Self::Item>>>;

    /// Channels for the current parameters; empty when inactive.
    fn channels(&self) -> Vec<ChannelSpec>;

    fn items(&self) -> &[Self::Item] {
        self.mirror().items()
    }

    fn load_state(&self) -> LoadState {
        self.mirror().state()
    }

    fn is_loading(&self) -> bool {
        self.mirror().state() != LoadState::Ready
    }

    /// Opens channels for the current parameters and runs the first fetch.
    ///
    /// Any channels from a previous mount are closed first.
    fn mount(&mut self) -> StoreResult<()> {
        self.mirror_mut().begin_initial_load();
        open_channels(self)?;
        self.refresh()
    }

    /// Replaces the snapshot with a fresh remote read.
    fn refresh(&mut self) -> StoreResult<()> {
        let ctx = self.context();
        let started_at = Instant::now();
        match self.load() {
            Ok(Some(items)) => {
                debug!(
                    "event=store_refresh module=store status=ok resource={} rows={} duration_ms={}",
                    Self::RESOURCE,
                    items.len(),
                    started_at.elapsed().as_millis()
                );
                self.mirror_mut().replace(items);
                Ok(())
            }
            Ok(None) => {
                debug!(
                    "event=store_refresh module=store status=skipped resource={}",
                    Self::RESOURCE
                );
                self.mirror_mut().clear();
                Ok(())
            }
            Err(err) => {
                self.mirror_mut().settle();
                error!(
                    "event=store_refresh module=store status=error resource={} duration_ms={} error={}",
                    Self::RESOURCE,
                    started_at.elapsed().as_millis(),
                    err
                );
                ctx.notifier
                    .error(&format!("Failed to load {}", Self::RESOURCE));
                Err(err)
            }
        }
    }

    /// Runs one refresh per pending change event.
    ///
    /// Returns the number of events consumed. Refresh failures are reported
    /// through the notifier and do not stop the remaining refreshes.
    fn process_notifications(&mut self) -> usize {
        refresh_pending(self)
    }

    /// Closes all channels. Events not yet processed are discarded.
    fn unmount(&mut self) {
        self.mirror_mut().teardown();
        debug!(
            "event=store_unmount module=store status=ok resource={}",
            Self::RESOURCE
        );
    }
}

/// Replaces the store's channels with `channels()` for its current
/// parameters. On failure no channel stays open.
pub(crate) fn open_channels<'r, S>(store: &mut S) -> StoreResult<()>
where
    S: ResourceStore<'r> + ?Sized,
{
    let ctx = store.context();
    store.mirror_mut().teardown();

    let specs = store.channels();
    let mut subscriptions = Vec::with_capacity(specs.len());
    for spec in specs {
        match ctx.remote.subscribe(spec) {
            Ok(subscription) => subscriptions.push(subscription),
            Err(err) => return Err(subscription_failed(store, err)),
        }
    }
    info!(
        "event=store_mount module=store status=ok resource={} channels={}",
        S::RESOURCE,
        subscriptions.len()
    );
    store.mirror_mut().attach(subscriptions);
    Ok(())
}

pub(crate) fn refresh_pending<'r, S>(store: &mut S) -> usize
where
    S: ResourceStore<'r> + ?Sized,
{
    let pending = store.mirror_mut().drain_notifications();
    for _ in 0..pending {
        let _ = store.refresh();
    }
    pending
}

fn subscription_failed<'r, S>(store: &mut S, err: RemoteError) -> StoreError
where
    S: ResourceStore<'r> + ?Sized,
{
    let ctx = store.context();
    store.mirror_mut().teardown();
    store.mirror_mut().settle();
    error!(
        "event=store_mount module=store status=error resource={} error={}",
        S::RESOURCE,
        err
    );
    ctx.notifier
        .error(&format!("Failed to subscribe to {}", S::RESOURCE));
    StoreError::Read(RepoError::Remote(err))
}

/// Logs a mutation outcome and reports failures to the operator.
///
/// Precondition failures carry their reason in the notice; remote failures
/// only carry `failure`.
pub(crate) fn report_mutation<T>(
    ctx: &StoreContext<'_>,
    op: &'static str,
    failure: &str,
    result: StoreResult<T>,
) -> StoreResult<T> {
    match result {
        Ok(value) => {
            info!("event=store_mutation module=store status=ok op={op}");
            Ok(value)
        }
        Err(err) => {
            warn!("event=store_mutation module=store status=error op={op} error={err}");
            let notice = match &err {
                StoreError::Precondition(precondition) => format!("{failure}: {precondition}"),
                StoreError::Read(_) | StoreError::Write(_) => failure.to_string(),
            };
            ctx.notifier.error(&notice);
            Err(err)
        }
    }
}
