//! Data-synchronization core for the TeamHub collaboration client.
//!
//! Resource stores mirror remote collections (profiles, projects, tasks,
//! messages, ratings, join requests, team members), refetch on change
//! notifications and write mutations through to the remote store.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod remote;
pub mod repo;
pub mod session;
pub mod store;

pub use config::ClientConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use remote::{RemoteError, RemoteStore, SqliteRemoteStore};
pub use repo::{RepoError, RepoResult};
pub use session::Session;
pub use store::join_requests::JoinRequestStore;
pub use store::messages::MessageStore;
pub use store::own_profile::OwnProfileStore;
pub use store::profile_directory::ProfileDirectoryStore;
pub use store::project_members::ProjectMemberStore;
pub use store::projects::ProjectStore;
pub use store::ratings::RatingStore;
pub use store::tasks::TaskStore;
pub use store::{
    LoadState, Precondition, ResourceStore, StoreContext, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
