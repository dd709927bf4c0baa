//! In-process [`TaskStore`] used in tests and for throwaway instances.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use crate::domain::{OwnerId, Task, TaskCount, TaskDraft, TaskId, TaskQuery, TaskSort, TaskStatus};
use crate::services::task_store::TaskStore;

#[derive(Default)]
struct Rows {
    tasks: Vec<Task>,
    next_id: i32,
}

#[derive(Default)]
pub struct MemoryTaskStore {
    rows: RwLock<Rows>,
    writes: AtomicUsize,
}

impl MemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls that reached the store, successful or not.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

/// `None` sorts after any date, matching `NULLS LAST`.
fn cmp_due(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive over ASCII, like SQLite's `LOWER`.
fn cmp_title(a: &Task, b: &Task) -> Ordering {
    a.title
        .bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.title.bytes().map(|c| c.to_ascii_lowercase()))
}

fn cmp_for(sort: TaskSort, a: &Task, b: &Task) -> Ordering {
    match sort {
        TaskSort::DueDate => cmp_due(a, b).then(a.id.cmp(&b.id)),
        TaskSort::Title => cmp_title(a, b).then(a.id.cmp(&b.id)),
        TaskSort::CreatedAt => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
        TaskSort::Status => a
            .status
            .as_str()
            .cmp(b.status.as_str())
            .then_with(|| cmp_due(a, b))
            .then(a.id.cmp(&b.id)),
    }
}

fn owned_by<'a>(task: &'a Task, owner: &OwnerId) -> Option<&'a Task> {
    (task.user_id == owner.as_str()).then_some(task)
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, owner: &OwnerId, draft: &TaskDraft) -> Result<Task> {
        self.record_write();
        let mut rows = self.rows.write().await;
        rows.next_id += 1;

        let task = Task {
            id: TaskId::new(rows.next_id),
            title: draft.title.clone(),
            description: draft.description.clone(),
            due_date: draft.due_date,
            status: draft.status,
            user_id: owner.as_str().to_string(),
            created_at: Utc::now(),
        };
        rows.tasks.push(task.clone());
        Ok(task)
    }

    async fn find(&self, owner: &OwnerId, id: TaskId) -> Result<Option<Task>> {
        let rows = self.rows.read().await;
        Ok(rows
            .tasks
            .iter()
            .filter_map(|t| owned_by(t, owner))
            .find(|t| t.id == id)
            .cloned())
    }

    async fn list(&self, owner: &OwnerId, query: TaskQuery) -> Result<Vec<Task>> {
        let rows = self.rows.read().await;
        let mut tasks: Vec<Task> = rows
            .tasks
            .iter()
            .filter_map(|t| owned_by(t, owner))
            .filter(|t| query.status.is_none_or(|status| t.status == status))
            .cloned()
            .collect();

        tasks.sort_by(|a, b| cmp_for(query.sort, a, b));
        Ok(tasks)
    }

    async fn update(&self, owner: &OwnerId, id: TaskId, draft: &TaskDraft) -> Result<bool> {
        self.record_write();
        let mut rows = self.rows.write().await;
        let Some(task) = rows
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner.as_str())
        else {
            return Ok(false);
        };

        task.title.clone_from(&draft.title);
        task.description.clone_from(&draft.description);
        task.due_date = draft.due_date;
        task.status = draft.status;
        Ok(true)
    }

    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<bool> {
        self.record_write();
        let mut rows = self.rows.write().await;
        let before = rows.tasks.len();
        rows.tasks
            .retain(|t| !(t.id == id && t.user_id == owner.as_str()));
        Ok(rows.tasks.len() < before)
    }

    async fn set_status(&self, owner: &OwnerId, id: TaskId, status: TaskStatus) -> Result<bool> {
        self.record_write();
        let mut rows = self.rows.write().await;
        let Some(task) = rows
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner.as_str())
        else {
            return Ok(false);
        };

        task.status = status;
        Ok(true)
    }

    async fn count(&self, owner: &OwnerId, which: TaskCount) -> Result<u64> {
        let rows = self.rows.read().await;
        let count = rows
            .tasks
            .iter()
            .filter_map(|t| owned_by(t, owner))
            .filter(|t| match which {
                TaskCount::All => true,
                TaskCount::WithStatus(status) => t.status == status,
                TaskCount::OverdueAsOf(today) => t.is_overdue(today),
            })
            .count();

        Ok(count as u64)
    }

    async fn recent(&self, owner: &OwnerId, limit: u64) -> Result<Vec<Task>> {
        let mut tasks = self.list(owner, TaskQuery {
            status: None,
            sort: TaskSort::CreatedAt,
        })
        .await?;
        tasks.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(tasks)
    }
}
