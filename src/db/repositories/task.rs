use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, Order, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::domain::{OwnerId, Task, TaskCount, TaskDraft, TaskId, TaskQuery, TaskSort, TaskStatus};
use crate::entities::{prelude::*, tasks};
use crate::services::task_store::TaskStore;

impl From<tasks::Model> for Task {
    fn from(model: tasks::Model) -> Self {
        Self {
            id: TaskId::new(model.id),
            title: model.title,
            description: model.description,
            due_date: model.due_date,
            status: model.status,
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

pub struct TaskRepository {
    conn: DatabaseConnection,
}

fn owned_by(owner: &OwnerId) -> Condition {
    Condition::all().add(tasks::Column::UserId.eq(owner.as_str()))
}

fn row(owner: &OwnerId, id: TaskId) -> Condition {
    owned_by(owner).add(tasks::Column::Id.eq(id.value()))
}

/// Due date ascending with undated rows after every dated one.
fn order_by_due(select: Select<Tasks>) -> Select<Tasks> {
    select
        .order_by(Expr::col(tasks::Column::DueDate).is_null(), Order::Asc)
        .order_by_asc(tasks::Column::DueDate)
}

fn apply_sort(select: Select<Tasks>, sort: TaskSort) -> Select<Tasks> {
    match sort {
        TaskSort::DueDate => order_by_due(select).order_by_asc(tasks::Column::Id),
        TaskSort::Title => select
            .order_by(
                SimpleExpr::from(Func::lower(Expr::col(tasks::Column::Title))),
                Order::Asc,
            )
            .order_by_asc(tasks::Column::Id),
        TaskSort::CreatedAt => select
            .order_by_desc(tasks::Column::CreatedAt)
            .order_by_desc(tasks::Column::Id),
        TaskSort::Status => {
            order_by_due(select.order_by_asc(tasks::Column::Status)).order_by_asc(tasks::Column::Id)
        }
    }
}

impl TaskRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn insert(&self, owner: &OwnerId, draft: &TaskDraft) -> Result<Task> {
        let now = Utc::now();
        let model = tasks::ActiveModel {
            title: Set(draft.title.clone()),
            description: Set(draft.description.clone()),
            due_date: Set(draft.due_date),
            status: Set(draft.status),
            user_id: Set(owner.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert task")?;

        Ok(Task::from(model))
    }

    async fn find(&self, owner: &OwnerId, id: TaskId) -> Result<Option<Task>> {
        let model = Tasks::find()
            .filter(row(owner, id))
            .one(&self.conn)
            .await
            .context("Failed to query task")?;

        Ok(model.map(Task::from))
    }

    async fn list(&self, owner: &OwnerId, query: TaskQuery) -> Result<Vec<Task>> {
        let mut select = Tasks::find().filter(owned_by(owner));
        if let Some(status) = query.status {
            select = select.filter(tasks::Column::Status.eq(status));
        }

        let models = apply_sort(select, query.sort)
            .all(&self.conn)
            .await
            .context("Failed to list tasks")?;

        Ok(models.into_iter().map(Task::from).collect())
    }

    async fn update(&self, owner: &OwnerId, id: TaskId, draft: &TaskDraft) -> Result<bool> {
        let result = Tasks::update_many()
            .set(tasks::ActiveModel {
                title: Set(draft.title.clone()),
                description: Set(draft.description.clone()),
                due_date: Set(draft.due_date),
                status: Set(draft.status),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(row(owner, id))
            .exec(&self.conn)
            .await
            .context("Failed to update task")?;

        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<bool> {
        let result = Tasks::delete_many()
            .filter(row(owner, id))
            .exec(&self.conn)
            .await
            .context("Failed to delete task")?;

        Ok(result.rows_affected > 0)
    }

    async fn set_status(&self, owner: &OwnerId, id: TaskId, status: TaskStatus) -> Result<bool> {
        let result = Tasks::update_many()
            .set(tasks::ActiveModel {
                status: Set(status),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(row(owner, id))
            .exec(&self.conn)
            .await
            .context("Failed to update task status")?;

        Ok(result.rows_affected > 0)
    }

    async fn count(&self, owner: &OwnerId, which: TaskCount) -> Result<u64> {
        let condition = match which {
            TaskCount::All => owned_by(owner),
            TaskCount::WithStatus(status) => owned_by(owner).add(tasks::Column::Status.eq(status)),
            TaskCount::OverdueAsOf(today) => owned_by(owner)
                .add(tasks::Column::Status.eq(TaskStatus::Pending))
                .add(tasks::Column::DueDate.lt(today)),
        };

        Tasks::find()
            .filter(condition)
            .count(&self.conn)
            .await
            .context("Failed to count tasks")
    }

    async fn recent(&self, owner: &OwnerId, limit: u64) -> Result<Vec<Task>> {
        let models = Tasks::find()
            .filter(owned_by(owner))
            .order_by_desc(tasks::Column::CreatedAt)
            .order_by_desc(tasks::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to load recent tasks")?;

        Ok(models.into_iter().map(Task::from).collect())
    }
}
