use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::TaskId;

/// Lifecycle state of a task.
///
/// Two states only. Either can be reached from the other by a user toggle;
/// nothing moves a task automatically.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// The state a toggle moves to.
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Ordering applied to a task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Due date ascending, undated tasks last.
    #[default]
    DueDate,
    Title,
    /// Newest first.
    CreatedAt,
    /// Status ascending, then due date ascending.
    Status,
}

impl TaskSort {
    /// Parses a `sort` query value. Unknown keys fall back to [`TaskSort::DueDate`].
    #[must_use]
    pub fn from_key(key: Option<&str>) -> Self {
        match key {
            Some("title") => Self::Title,
            Some("createdAt") => Self::CreatedAt,
            Some("status") => Self::Status,
            _ => Self::DueDate,
        }
    }

    #[must_use]
    pub const fn as_key(&self) -> &'static str {
        match self {
            Self::DueDate => "dueDate",
            Self::Title => "title",
            Self::CreatedAt => "createdAt",
            Self::Status => "status",
        }
    }
}

/// Filter and ordering for a listing. The owner is never part of this
/// struct; stores take it as a separate argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub sort: TaskSort,
}

impl TaskQuery {
    /// Builds a query from raw `status` / `sort` parameters. A status other
    /// than `pending` or `completed` means "all".
    #[must_use]
    pub fn from_params(status: Option<&str>, sort: Option<&str>) -> Self {
        Self {
            status: status.and_then(|s| s.parse().ok()),
            sort: TaskSort::from_key(sort),
        }
    }
}

/// Which subset of an owner's tasks to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCount {
    All,
    WithStatus(TaskStatus),
    /// Pending tasks due strictly before the given day.
    OverdueAsOf(NaiveDate),
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Pending and due strictly before `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == TaskStatus::Pending && self.due_date.is_some_and(|due| due < today)
    }
}

/// Raw task fields as submitted by a form. Kept verbatim so a rejected
/// submission can be shown back to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    /// The submitting browser's local date, filled in by the page script.
    pub client_today: Option<String>,
}

impl TaskInput {
    /// Input pre-filled from an existing task, for the edit form.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: task.description.clone(),
            due_date: task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            status: Some(task.status.to_string()),
            client_today: None,
        }
    }
}

/// Validated, normalised task fields ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: u64,
    pub pending: u64,
    pub completed: u64,
    pub overdue: u64,
    pub recent: Vec<Task>,
}
