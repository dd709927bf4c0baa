//! Storage contract for task rows.
//!
//! Every method takes the owner explicitly; no method addresses a row by id
//! alone.

use anyhow::Result;

use crate::domain::{OwnerId, Task, TaskCount, TaskDraft, TaskId, TaskQuery, TaskStatus};

#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new row owned by `owner` and returns it as stored.
    async fn insert(&self, owner: &OwnerId, draft: &TaskDraft) -> Result<Task>;

    /// Returns the task only if it belongs to `owner`.
    async fn find(&self, owner: &OwnerId, id: TaskId) -> Result<Option<Task>>;

    /// Lists the owner's tasks, filtered and ordered per `query`.
    async fn list(&self, owner: &OwnerId, query: TaskQuery) -> Result<Vec<Task>>;

    /// Overwrites the editable fields of `(id, owner)`. Returns whether a row matched.
    async fn update(&self, owner: &OwnerId, id: TaskId, draft: &TaskDraft) -> Result<bool>;

    /// Removes `(id, owner)`. Returns whether a row was removed.
    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<bool>;

    /// Sets the status of `(id, owner)`. Returns whether a row matched.
    async fn set_status(&self, owner: &OwnerId, id: TaskId, status: TaskStatus) -> Result<bool>;

    async fn count(&self, owner: &OwnerId, which: TaskCount) -> Result<u64>;

    /// The owner's newest tasks by creation time.
    async fn recent(&self, owner: &OwnerId, limit: u64) -> Result<Vec<Task>>;
}
