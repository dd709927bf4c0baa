//! Task access layer.
//!
//! Resolves every request into store calls scoped to the acting owner,
//! applies the task input rules and the `pending`/`completed` state
//! machine, and derives the dashboard view.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::validation::validate_task;
use crate::domain::{
    DashboardStats, OwnerId, Task, TaskCount, TaskId, TaskInput, TaskQuery, TaskStatus,
};
use crate::services::clock::Clock;
use crate::services::task_store::TaskStore;

/// How many tasks the dashboard shows as "recent".
pub const RECENT_TASKS_LIMIT: u64 = 5;

/// Errors specific to task operations.
///
/// A task that exists but belongs to someone else is reported exactly like a
/// task that does not exist.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Validation failed: {}", errors.join(", "))]
    Validation {
        errors: Vec<String>,
        /// The submission as received, for re-display.
        input: TaskInput,
    },

    #[error("Task not found")]
    NotFound,

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(format!("{err:#}"))
    }
}

impl From<sea_orm::DbErr> for TaskError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(err.to_string())
    }
}

fn record_mutation(op: &'static str) {
    metrics::counter!("tasks_mutations_total", "op" => op).increment(1);
}

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    #[must_use]
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    #[must_use]
    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    pub async fn create(&self, owner: &OwnerId, input: TaskInput) -> Result<Task, TaskError> {
        let today = self.clock.resolve_today(input.client_today.as_deref());
        let draft = match validate_task(&input, today) {
            Ok(draft) => draft,
            Err(errors) => return Err(TaskError::Validation { errors, input }),
        };

        let task = self.store.insert(owner, &draft).await?;
        record_mutation("create");
        info!(owner = %owner, task_id = %task.id, "Task created");
        Ok(task)
    }

    pub async fn list(&self, owner: &OwnerId, query: TaskQuery) -> Result<Vec<Task>, TaskError> {
        let tasks = self.store.list(owner, query).await?;
        debug!(
            owner = %owner,
            status = ?query.status,
            sort = query.sort.as_key(),
            count = tasks.len(),
            "Listed tasks"
        );
        Ok(tasks)
    }

    /// Loads a task for the edit form.
    pub async fn get_for_edit(&self, owner: &OwnerId, id: TaskId) -> Result<Task, TaskError> {
        self.store
            .find(owner, id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn update(
        &self,
        owner: &OwnerId,
        id: TaskId,
        input: TaskInput,
    ) -> Result<(), TaskError> {
        let today = self.clock.resolve_today(input.client_today.as_deref());
        let draft = match validate_task(&input, today) {
            Ok(draft) => draft,
            Err(errors) => return Err(TaskError::Validation { errors, input }),
        };

        if !self.store.update(owner, id, &draft).await? {
            return Err(TaskError::NotFound);
        }

        record_mutation("update");
        info!(owner = %owner, task_id = %id, "Task updated");
        Ok(())
    }

    pub async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<(), TaskError> {
        if !self.store.delete(owner, id).await? {
            return Err(TaskError::NotFound);
        }

        record_mutation("delete");
        info!(owner = %owner, task_id = %id, "Task deleted");
        Ok(())
    }

    /// Moves a task to `raw_status`. The value is checked before the store
    /// is touched.
    pub async fn set_status(
        &self,
        owner: &OwnerId,
        id: TaskId,
        raw_status: &str,
    ) -> Result<TaskStatus, TaskError> {
        let status: TaskStatus = raw_status
            .parse()
            .map_err(|_| TaskError::InvalidStatus(raw_status.to_string()))?;

        if !self.store.set_status(owner, id, status).await? {
            return Err(TaskError::NotFound);
        }

        record_mutation("set_status");
        info!(owner = %owner, task_id = %id, status = %status, "Task status changed");
        Ok(status)
    }

    /// Counts and recent tasks for the dashboard. The reads run concurrently
    /// and are not taken from a single snapshot.
    pub async fn dashboard(&self, owner: &OwnerId) -> Result<DashboardStats, TaskError> {
        let today = self.clock.today();

        let (total, pending, completed, overdue, recent) = futures::try_join!(
            self.store.count(owner, TaskCount::All),
            self.store
                .count(owner, TaskCount::WithStatus(TaskStatus::Pending)),
            self.store
                .count(owner, TaskCount::WithStatus(TaskStatus::Completed)),
            self.store.count(owner, TaskCount::OverdueAsOf(today)),
            self.store.recent(owner, RECENT_TASKS_LIMIT),
        )?;

        Ok(DashboardStats {
            total,
            pending,
            completed,
            overdue,
            recent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskSort;
    use crate::domain::validation::{DUE_DATE_IN_PAST, TITLE_TOO_SHORT};
    use crate::services::clock::FixedClock;
    use crate::services::memory_task_store::MemoryTaskStore;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn service() -> (TaskService, Arc<MemoryTaskStore>) {
        let store = Arc::new(MemoryTaskStore::new());
        let service = TaskService::new(store.clone(), Arc::new(FixedClock(today())));
        (service, store)
    }

    fn input(title: &str, due: Option<NaiveDate>) -> TaskInput {
        TaskInput {
            title: Some(title.to_string()),
            due_date: due.map(|d| d.format("%Y-%m-%d").to_string()),
            ..TaskInput::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_pending() {
        let (service, _) = service();
        let owner = OwnerId::new("alice");

        let task = service
            .create(&owner, input("  Water plants ", None))
            .await
            .unwrap();

        assert_eq!(task.title, "Water plants");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.user_id, "alice");
        assert_eq!(task.due_date, None);
    }

    #[tokio::test]
    async fn test_create_validation_failure_writes_nothing() {
        let (service, store) = service();
        let owner = OwnerId::new("alice");
        let submitted = input("ab", today().pred_opt());

        let err = service.create(&owner, submitted.clone()).await.unwrap_err();
        match err {
            TaskError::Validation { errors, input } => {
                assert_eq!(
                    errors,
                    vec![TITLE_TOO_SHORT.to_string(), DUE_DATE_IN_PAST.to_string()]
                );
                assert_eq!(input, submitted);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_due_date_today_or_later_accepted() {
        let (service, _) = service();
        let owner = OwnerId::new("alice");

        assert!(service.create(&owner, input("Today", Some(today()))).await.is_ok());
        assert!(
            service
                .create(&owner, input("Tomorrow", today().succ_opt()))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let (service, _) = service();
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");

        let task = service.create(&alice, input("Secret", None)).await.unwrap();

        assert!(matches!(
            service.get_for_edit(&bob, task.id).await,
            Err(TaskError::NotFound)
        ));
        assert!(matches!(
            service.update(&bob, task.id, input("Hijacked", None)).await,
            Err(TaskError::NotFound)
        ));
        assert!(matches!(
            service.delete(&bob, task.id).await,
            Err(TaskError::NotFound)
        ));
        assert!(matches!(
            service.set_status(&bob, task.id, "completed").await,
            Err(TaskError::NotFound)
        ));

        let still_there = service.get_for_edit(&alice, task.id).await.unwrap();
        assert_eq!(still_there.title, "Secret");
        assert_eq!(still_there.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_id_matches_foreign_id() {
        let (service, _) = service();
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");
        let task = service.create(&alice, input("Secret", None)).await.unwrap();

        let foreign = service.delete(&bob, task.id).await.unwrap_err();
        let missing = service.delete(&bob, TaskId::new(9999)).await.unwrap_err();
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn test_update_rejects_past_due_date_without_writing() {
        let (service, store) = service();
        let owner = OwnerId::new("alice");
        let task = service.create(&owner, input("Original", None)).await.unwrap();
        let writes = store.write_count();

        let err = service
            .update(&owner, task.id, input("Changed", today().pred_opt()))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation { .. }));
        assert_eq!(store.write_count(), writes);

        let unchanged = service.get_for_edit(&owner, task.id).await.unwrap();
        assert_eq!(unchanged.title, "Original");
    }

    #[tokio::test]
    async fn test_update_applies_fields() {
        let (service, _) = service();
        let owner = OwnerId::new("alice");
        let task = service.create(&owner, input("Original", None)).await.unwrap();

        let changes = TaskInput {
            description: Some(" notes ".to_string()),
            status: Some("completed".to_string()),
            ..input("Renamed", today().succ_opt())
        };
        service.update(&owner, task.id, changes).await.unwrap();

        let updated = service.get_for_edit(&owner, task.id).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("notes"));
        assert_eq!(updated.due_date, today().succ_opt());
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_set_status_rejects_unknown_value_before_store() {
        let (service, store) = service();
        let owner = OwnerId::new("alice");
        let task = service.create(&owner, input("Task", None)).await.unwrap();
        let writes = store.write_count();

        let err = service
            .set_status(&owner, task.id, "archived")
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidStatus(ref s) if s == "archived"));
        assert_eq!(store.write_count(), writes);

        // Also rejected for ids that do not exist: the value check comes first.
        let err = service
            .set_status(&owner, TaskId::new(404), "archived")
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn test_set_status_is_idempotent_and_reversible() {
        let (service, _) = service();
        let owner = OwnerId::new("alice");
        let task = service.create(&owner, input("Task", None)).await.unwrap();

        assert_eq!(
            service.set_status(&owner, task.id, "pending").await.unwrap(),
            TaskStatus::Pending
        );
        assert_eq!(
            service.get_for_edit(&owner, task.id).await.unwrap().status,
            TaskStatus::Pending
        );

        service.set_status(&owner, task.id, "completed").await.unwrap();
        service.set_status(&owner, task.id, "completed").await.unwrap();
        assert_eq!(
            service.get_for_edit(&owner, task.id).await.unwrap().status,
            TaskStatus::Completed
        );

        service.set_status(&owner, task.id, "pending").await.unwrap();
        assert_eq!(
            service.get_for_edit(&owner, task.id).await.unwrap().status,
            TaskStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let (service, _) = service();
        let owner = OwnerId::new("alice");
        let task = service.create(&owner, input("Task", None)).await.unwrap();

        service.delete(&owner, task.id).await.unwrap();
        assert!(matches!(
            service.delete(&owner, task.id).await,
            Err(TaskError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let (service, _) = service();
        let owner = OwnerId::new("alice");
        let other = OwnerId::new("bob");
        let day = |n: u32| NaiveDate::from_ymd_opt(2026, 3, n);

        let c = service.create(&owner, input("Charlie", day(15))).await.unwrap();
        let a = service.create(&owner, input("Alpha", day(20))).await.unwrap();
        let b = service.create(&owner, input("Bravo", day(12))).await.unwrap();
        service.create(&other, input("Not mine", day(11))).await.unwrap();
        service.set_status(&owner, a.id, "completed").await.unwrap();

        let all = service.list(&owner, TaskQuery::default()).await.unwrap();
        let ids: Vec<TaskId> = all.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);

        let pending = service
            .list(&owner, TaskQuery::from_params(Some("pending"), None))
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|t| t.status == TaskStatus::Pending));

        let by_title = service
            .list(&owner, TaskQuery::from_params(None, Some("title")))
            .await
            .unwrap();
        let titles: Vec<&str> = by_title.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Bravo", "Charlie"]);

        let newest_first = service
            .list(&owner, TaskQuery::from_params(None, Some("createdAt")))
            .await
            .unwrap();
        let ids: Vec<TaskId> = newest_first.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);

        let by_status = service
            .list(&owner, TaskQuery::from_params(None, Some("status")))
            .await
            .unwrap();
        let ids: Vec<TaskId> = by_status.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);

        let fallback = service
            .list(
                &owner,
                TaskQuery {
                    status: None,
                    sort: TaskSort::from_key(Some("bogus")),
                },
            )
            .await
            .unwrap();
        assert_eq!(fallback, all);
    }

    #[tokio::test]
    async fn test_dashboard_counts_overdue() {
        let store = Arc::new(MemoryTaskStore::new());
        let owner = OwnerId::new("alice");

        // Seed with a clock one day behind so "yesterday" is still valid input.
        let seeding = TaskService::new(
            store.clone(),
            Arc::new(FixedClock(today().pred_opt().unwrap())),
        );
        seeding
            .create(&owner, input("Yesterday", today().pred_opt()))
            .await
            .unwrap();
        seeding
            .create(&owner, input("Today", Some(today())))
            .await
            .unwrap();
        seeding
            .create(&owner, input("Tomorrow", today().succ_opt()))
            .await
            .unwrap();

        let service = TaskService::new(store, Arc::new(FixedClock(today())));
        let stats = service.dashboard(&owner).await.unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.recent.len(), 3);

        let empty = service.dashboard(&OwnerId::new("bob")).await.unwrap();
        assert_eq!(empty, DashboardStats::default());
    }

    #[tokio::test]
    async fn test_dashboard_recent_is_capped() {
        let (service, _) = service();
        let owner = OwnerId::new("alice");
        for n in 0..7 {
            service
                .create(&owner, input(&format!("Task {n}"), None))
                .await
                .unwrap();
        }

        let stats = service.dashboard(&owner).await.unwrap();
        assert_eq!(stats.total, 7);
        assert_eq!(stats.recent.len(), 5);
        assert_eq!(stats.recent[0].title, "Task 6");
    }
}
