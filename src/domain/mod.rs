//! Domain types for task management with strong typing.
//!
//! Task rows are always addressed through an [`OwnerId`]; the newtypes here
//! keep a task id from being used where an owner is expected and the other
//! way around.

pub mod task;
pub mod user;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use task::{
    DashboardStats, ParseStatusError, Task, TaskCount, TaskDraft, TaskInput, TaskQuery, TaskSort,
    TaskStatus,
};
pub use user::{LoginInput, RegistrationInput, RetainedFields};

/// Identifier of the user who owns a set of tasks.
///
/// Only the session boundary should construct one of these for a live
/// request; the task layer never reads an owner from request input.
///
/// # Examples
///
/// ```rust
/// use taskboard::domain::OwnerId;
///
/// let owner = OwnerId::new("42");
/// assert_eq!(owner.as_str(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(i32);

impl TaskId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for TaskId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}
