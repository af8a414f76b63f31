//! Task board store.

use super::{
    report_mutation, Mirror, Placement, Precondition, ResourceStore, StoreContext, StoreError,
    StoreResult,
};
use crate::model::task::{Task, TaskDraft, TaskId, TaskPriority};
use crate::remote::{ChannelSpec, Table};
use crate::repo::task_repo::TaskRepository;

pub struct TaskStore<'r> {
    ctx: StoreContext<'r>,
    mirror: Mirror<Task>,
}

impl<'r> TaskStore<'r> {
    pub fn new(ctx: StoreContext<'r>) -> Self {
        Self {
            ctx,
            mirror: Mirror::new(),
        }
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.mirror.find(|task| task.id == id)
    }

    pub fn with_priority(&self, priority: TaskPriority) -> Vec<&Task> {
        self.items()
            .iter()
            .filter(|task| task.priority == priority)
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.items().iter().filter(|task| task.is_completed()).count()
    }

    pub fn create_task(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        let ctx = self.ctx;
        let result = ctx.require_account().and_then(|creator| {
            draft.validate()?;
            TaskRepository::new(ctx.remote)
                .create(&draft.into_new_task(creator))
                .map_err(StoreError::Write)
        });
        let task = report_mutation(&ctx, "create_task", "Failed to create task", result)?;

        ctx.notifier.success("Task created!");
        self.mirror
            .merge(task.clone(), Placement::Front, |existing| existing.id == task.id);
        Ok(task)
    }

    /// Flips a task between `todo` and `completed`.
    ///
    /// The current status is read from the local snapshot.
    pub fn toggle_task(&mut self, id: TaskId) -> StoreResult<Task> {
        let ctx = self.ctx;
        let result = ctx.require_account().and_then(|_| {
            let current = self
                .find(id)
                .ok_or(StoreError::Precondition(Precondition::UnknownTask(id)))?;
            TaskRepository::new(ctx.remote)
                .set_status(id, current.status.toggled())
                .map_err(StoreError::Write)
        });
        let task = report_mutation(&ctx, "toggle_task", "Failed to update task", result)?;

        if task.is_completed() {
            ctx.notifier.success("Task completed! Great work!");
        }
        self.mirror
            .merge(task.clone(), Placement::Front, |existing| existing.id == task.id);
        Ok(task)
    }
}

impl<'r> ResourceStore<'r> for TaskStore<'r> {
    type Item = Task;

    const RESOURCE: &'static str = "tasks";

    fn context(&self) -> StoreContext<'r> {
        self.ctx
    }

    fn mirror(&self) -> &Mirror<Task> {
        &self.mirror
    }

    fn mirror_mut(&mut self) -> &mut Mirror<Task> {
        &mut self.mirror
    }

    fn load(&self) -> StoreResult<Option<Vec<Task>>> {
        if !self.ctx.session.is_authenticated() {
            return Ok(None);
        }
        TaskRepository::new(self.ctx.remote)
            .list_all()
            .map(Some)
            .map_err(StoreError::Read)
    }

    fn channels(&self) -> Vec<ChannelSpec> {
        if !self.ctx.session.is_authenticated() {
            return Vec::new();
        }
        vec![ChannelSpec::table(Table::Tasks)]
    }
}
