use crate::domain::TaskId;

/// Parses a task id path segment. Anything that is not a positive integer
/// cannot name a task.
#[must_use]
pub fn parse_task_id(raw: &str) -> Option<TaskId> {
    raw.parse::<i32>().ok().filter(|id| *id > 0).map(TaskId::new)
}

/// Accepts only local absolute paths as post-login destinations.
#[must_use]
pub fn safe_return_path(raw: &str) -> Option<&str> {
    (raw.starts_with('/') && !raw.starts_with("//") && !raw.contains('\\')).then_some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id("42"), Some(TaskId::new(42)));
        assert_eq!(parse_task_id("0"), None);
        assert_eq!(parse_task_id("-3"), None);
        assert_eq!(parse_task_id("abc"), None);
        assert_eq!(parse_task_id("4.2"), None);
    }

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path("/tasks/list?sort=title"), Some("/tasks/list?sort=title"));
        assert_eq!(safe_return_path("//evil.example"), None);
        assert_eq!(safe_return_path("https://evil.example"), None);
        assert_eq!(safe_return_path("/\\evil.example"), None);
    }
}
