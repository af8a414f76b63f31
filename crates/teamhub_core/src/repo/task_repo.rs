//! Task reads and writes.

use super::{decode_row, decode_rows, decode_updated, encode, id_value, RepoResult};
use crate::model::task::{NewTask, Task, TaskId, TaskStatus};
use crate::remote::{eq_filter, Direction, Query, RemoteStore, Table};
use serde_json::json;

pub struct TaskRepository<'r> {
    remote: &'r dyn RemoteStore,
}

impl<'r> TaskRepository<'r> {
    pub fn new(remote: &'r dyn RemoteStore) -> Self {
        Self { remote }
    }

    /// All visible tasks, newest first.
    pub fn list_all(&self) -> RepoResult<Vec<Task>> {
        let rows = self
            .remote
            .select(&Query::table(Table::Tasks).order_by("created_at", Direction::Descending))?;
        decode_rows(Table::Tasks, rows)
    }

    pub fn create(&self, task: &NewTask) -> RepoResult<Task> {
        let row = self.remote.insert(Table::Tasks, encode(Table::Tasks, task)?)?;
        decode_row(Table::Tasks, row)
    }

    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<Task> {
        let patch = encode(Table::Tasks, &json!({ "status": status }))?;
        let rows = self
            .remote
            .update(Table::Tasks, patch, &eq_filter("id", id_value(id)))?;
        decode_updated(Table::Tasks, id, rows)
    }
}
