//! Input rules for task and registration forms.
//!
//! Every rule runs even after an earlier one fails, so a single submission
//! reports all of its problems at once, in a stable order.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use super::{RegistrationInput, TaskDraft, TaskInput, TaskStatus};

pub const TITLE_MIN_CHARS: usize = 3;
pub const USERNAME_MIN_CHARS: usize = 3;
pub const PASSWORD_MIN_CHARS: usize = 6;

pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters long";
pub const DUE_DATE_IN_PAST: &str = "Due date cannot be in the past";
pub const DUE_DATE_INVALID: &str = "Due date must be a valid date";
pub const STATUS_INVALID: &str = "Status must be either pending or completed";

pub const USERNAME_TOO_SHORT: &str = "Username must be at least 3 characters long";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

/// Parses a `YYYY-MM-DD` form value. Blank means "no date".
fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, ()> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ()),
    }
}

/// Validates and normalises task fields against the given calendar day.
pub fn validate_task(input: &TaskInput, today: NaiveDate) -> Result<TaskDraft, Vec<String>> {
    let mut errors = Vec::new();

    let title = input.title.as_deref().map(str::trim).unwrap_or_default();
    if title.chars().count() < TITLE_MIN_CHARS {
        errors.push(TITLE_TOO_SHORT.to_string());
    }

    let due_date = match parse_date(input.due_date.as_deref()) {
        Ok(Some(due)) if due < today => {
            errors.push(DUE_DATE_IN_PAST.to_string());
            None
        }
        Ok(due) => due,
        Err(()) => {
            errors.push(DUE_DATE_INVALID.to_string());
            None
        }
    };

    let status = match input.status.as_deref().map(str::trim) {
        None | Some("") => TaskStatus::default(),
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            errors.push(STATUS_INVALID.to_string());
            TaskStatus::default()
        }),
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(TaskDraft {
        title: title.to_string(),
        description,
        due_date,
        status,
    })
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

pub fn validate_registration(input: &RegistrationInput) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if input.username.trim().chars().count() < USERNAME_MIN_CHARS {
        errors.push(USERNAME_TOO_SHORT.to_string());
    }

    if !is_valid_email(input.email.trim()) {
        errors.push(EMAIL_INVALID.to_string());
    }

    if input.password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(PASSWORD_TOO_SHORT.to_string());
    }

    if input.password != input.confirm_password {
        errors.push(PASSWORD_MISMATCH.to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn input(title: &str, due: Option<&str>) -> TaskInput {
        TaskInput {
            title: Some(title.to_string()),
            due_date: due.map(str::to_string),
            ..TaskInput::default()
        }
    }

    #[test]
    fn test_title_rules() {
        assert!(validate_task(&input("abc", None), today()).is_ok());
        assert!(validate_task(&input("  abc  ", None), today()).is_ok());

        let errors = validate_task(&input("  ab ", None), today()).unwrap_err();
        assert_eq!(errors, vec![TITLE_TOO_SHORT.to_string()]);

        let missing = TaskInput::default();
        let errors = validate_task(&missing, today()).unwrap_err();
        assert_eq!(errors, vec![TITLE_TOO_SHORT.to_string()]);
    }

    #[test]
    fn test_due_date_rules() {
        assert!(validate_task(&input("Task", Some("2026-03-10")), today()).is_ok());
        assert!(validate_task(&input("Task", Some("2026-03-11")), today()).is_ok());

        let errors = validate_task(&input("Task", Some("2026-03-09")), today()).unwrap_err();
        assert_eq!(errors, vec![DUE_DATE_IN_PAST.to_string()]);

        let errors = validate_task(&input("Task", Some("next week")), today()).unwrap_err();
        assert_eq!(errors, vec![DUE_DATE_INVALID.to_string()]);
    }

    #[test]
    fn test_errors_accumulate() {
        let errors = validate_task(&input("x", Some("2020-01-01")), today()).unwrap_err();
        assert_eq!(
            errors,
            vec![TITLE_TOO_SHORT.to_string(), DUE_DATE_IN_PAST.to_string()]
        );
    }

    #[test]
    fn test_normalisation() {
        let raw = TaskInput {
            title: Some("  Buy milk  ".to_string()),
            description: Some("   ".to_string()),
            due_date: Some(String::new()),
            status: None,
            client_today: None,
        };

        let draft = validate_task(&raw, today()).unwrap();
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.description, None);
        assert_eq!(draft.due_date, None);
        assert_eq!(draft.status, TaskStatus::Pending);

        let raw = TaskInput {
            description: Some("  two litres ".to_string()),
            status: Some("completed".to_string()),
            ..input("Buy milk", None)
        };
        let draft = validate_task(&raw, today()).unwrap();
        assert_eq!(draft.description.as_deref(), Some("two litres"));
        assert_eq!(draft.status, TaskStatus::Completed);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let raw = TaskInput {
            status: Some("archived".to_string()),
            ..input("Buy milk", None)
        };
        let errors = validate_task(&raw, today()).unwrap_err();
        assert_eq!(errors, vec![STATUS_INVALID.to_string()]);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user example.com"));
        assert!(!is_valid_email("user@ example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_registration_rules() {
        let valid = RegistrationInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        assert!(validate_registration(&valid).is_ok());

        let invalid = RegistrationInput {
            username: "al".to_string(),
            email: "alice".to_string(),
            password: "123".to_string(),
            confirm_password: "1234".to_string(),
        };
        let errors = validate_registration(&invalid).unwrap_err();
        assert_eq!(
            errors,
            vec![
                USERNAME_TOO_SHORT.to_string(),
                EMAIL_INVALID.to_string(),
                PASSWORD_TOO_SHORT.to_string(),
                PASSWORD_MISMATCH.to_string(),
            ]
        );
    }
}
