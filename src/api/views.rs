//! Server-rendered pages. Each page is an askama template under
//! `templates/`; every page extends `base.html`, which draws the navigation
//! for `nav_user`.

use askama::Template;
use axum::response::Html;
use chrono::NaiveDate;

use crate::domain::{
    DashboardStats, RetainedFields, Task, TaskId, TaskInput, TaskQuery, TaskSort, TaskStatus,
};
use crate::services::SessionUser;

/// Which task form is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskForm {
    Add,
    Edit(TaskId),
}

impl TaskForm {
    fn action(self) -> String {
        match self {
            Self::Add => "/tasks/add".to_string(),
            Self::Edit(id) => format!("/tasks/edit/{id}"),
        }
    }

    const fn heading(self) -> &'static str {
        match self {
            Self::Add => "Add Task",
            Self::Edit(_) => "Edit Task",
        }
    }
}

/// One `<option>` of a select box.
struct SelectOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

impl SelectOption {
    fn list(choices: &[(&'static str, &'static str)], current: &str) -> Vec<Self> {
        choices
            .iter()
            .map(|&(value, label)| Self {
                value,
                label,
                selected: value == current,
            })
            .collect()
    }
}

/// A task as shown in a list.
struct TaskRow<'a> {
    id: TaskId,
    title: &'a str,
    description: Option<&'a str>,
    due: String,
    status: &'static str,
    next_status: &'static str,
    completed: bool,
    overdue: bool,
}

impl<'a> TaskRow<'a> {
    fn new(task: &'a Task, today: NaiveDate) -> Self {
        Self {
            id: task.id,
            title: &task.title,
            description: task.description.as_deref(),
            due: task.due_date.map_or_else(
                || "No due date".to_string(),
                |d| d.format("%Y-%m-%d").to_string(),
            ),
            status: task.status.as_str(),
            next_status: task.status.toggled().as_str(),
            completed: task.status == TaskStatus::Completed,
            overdue: task.is_overdue(today),
        }
    }

    fn all(tasks: &'a [Task], today: NaiveDate) -> Vec<Self> {
        tasks.iter().map(|t| Self::new(t, today)).collect()
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    title: &'a str,
    nav_user: Option<&'a SessionUser>,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate<'a> {
    title: &'a str,
    nav_user: Option<&'a SessionUser>,
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    title: &'a str,
    nav_user: Option<&'a SessionUser>,
    errors: &'a [String],
    email: &'a str,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate<'a> {
    title: &'a str,
    nav_user: Option<&'a SessionUser>,
    errors: &'a [String],
    username: &'a str,
    email: &'a str,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    title: &'a str,
    nav_user: Option<&'a SessionUser>,
    username: &'a str,
    stats: &'a DashboardStats,
    rows: Vec<TaskRow<'a>>,
}

#[derive(Template)]
#[template(path = "task_list.html")]
struct TaskListTemplate<'a> {
    title: &'a str,
    nav_user: Option<&'a SessionUser>,
    statuses: Vec<SelectOption>,
    sorts: Vec<SelectOption>,
    rows: Vec<TaskRow<'a>>,
}

#[derive(Template)]
#[template(path = "task_form.html")]
struct TaskFormTemplate<'a> {
    title: &'a str,
    nav_user: Option<&'a SessionUser>,
    errors: &'a [String],
    action: String,
    task_title: &'a str,
    description: &'a str,
    due_date: &'a str,
    statuses: Vec<SelectOption>,
}

fn render(template: &impl Template) -> askama::Result<Html<String>> {
    template.render().map(Html)
}

pub fn error_page(user: Option<&SessionUser>, message: &str) -> askama::Result<Html<String>> {
    render(&ErrorTemplate {
        title: "Error",
        nav_user: user,
        message,
    })
}

pub fn not_found_page(user: Option<&SessionUser>) -> askama::Result<Html<String>> {
    render(&NotFoundTemplate {
        title: "Not Found",
        nav_user: user,
    })
}

pub fn login_page(errors: &[String], retained: &RetainedFields) -> askama::Result<Html<String>> {
    render(&LoginTemplate {
        title: "Login",
        nav_user: None,
        errors,
        email: &retained.email,
    })
}

pub fn register_page(
    errors: &[String],
    retained: &RetainedFields,
) -> askama::Result<Html<String>> {
    render(&RegisterTemplate {
        title: "Register",
        nav_user: None,
        errors,
        username: &retained.username,
        email: &retained.email,
    })
}

pub fn dashboard_page(
    user: &SessionUser,
    stats: &DashboardStats,
    today: NaiveDate,
) -> askama::Result<Html<String>> {
    render(&DashboardTemplate {
        title: "Dashboard",
        nav_user: Some(user),
        username: &user.username,
        stats,
        rows: TaskRow::all(&stats.recent, today),
    })
}

pub fn task_list_page(
    user: &SessionUser,
    tasks: &[Task],
    query: TaskQuery,
    today: NaiveDate,
) -> askama::Result<Html<String>> {
    let status_key = query.status.map(|s| s.as_str()).unwrap_or_default();
    let sorts = [
        (TaskSort::DueDate, "Due date"),
        (TaskSort::Title, "Title"),
        (TaskSort::CreatedAt, "Newest"),
        (TaskSort::Status, "Status"),
    ]
    .into_iter()
    .map(|(sort, label)| SelectOption {
        value: sort.as_key(),
        label,
        selected: sort == query.sort,
    })
    .collect();

    render(&TaskListTemplate {
        title: "Tasks",
        nav_user: Some(user),
        statuses: SelectOption::list(
            &[("", "All"), ("pending", "Pending"), ("completed", "Completed")],
            status_key,
        ),
        sorts,
        rows: TaskRow::all(tasks, today),
    })
}

pub fn task_form_page(
    user: &SessionUser,
    form: TaskForm,
    input: &TaskInput,
    errors: &[String],
) -> askama::Result<Html<String>> {
    render(&TaskFormTemplate {
        title: form.heading(),
        nav_user: Some(user),
        errors,
        action: form.action(),
        task_title: input.title.as_deref().unwrap_or_default(),
        description: input.description.as_deref().unwrap_or_default(),
        due_date: input.due_date.as_deref().unwrap_or_default(),
        statuses: SelectOption::list(
            &[("pending", "Pending"), ("completed", "Completed")],
            input.status.as_deref().unwrap_or("pending"),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> SessionUser {
        SessionUser {
            id: "1".to_string(),
            username: "<alice>".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    fn task(title: &str, due: Option<NaiveDate>, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(7),
            title: title.to_string(),
            description: Some("<b>bold</b>".to_string()),
            due_date: due,
            status,
            user_id: "1".to_string(),
            created_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_user_text_is_escaped() {
        let tasks = vec![task("<script>alert(1)</script>", None, TaskStatus::Pending)];
        let Html(page) =
            task_list_page(&user(), &tasks, TaskQuery::default(), today()).unwrap();

        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(page.contains("&lt;alice&gt;"));
    }

    #[test]
    fn test_overdue_marker() {
        let yesterday = today().pred_opt();

        let Html(late) = task_list_page(
            &user(),
            &[task("Late", yesterday, TaskStatus::Pending)],
            TaskQuery::default(),
            today(),
        )
        .unwrap();
        assert!(late.contains("badge overdue"));
        assert!(late.contains(r#"name="status" value="completed""#));

        let Html(done) = task_list_page(
            &user(),
            &[task("Done", yesterday, TaskStatus::Completed)],
            TaskQuery::default(),
            today(),
        )
        .unwrap();
        assert!(!done.contains("badge overdue"));
        assert!(done.contains("checked"));
    }

    #[test]
    fn test_forms_keep_input_but_not_passwords() {
        let retained = RetainedFields {
            username: "bob\"".to_string(),
            email: "bob@example.com".to_string(),
        };
        let Html(page) =
            register_page(&["Passwords do not match".to_string()], &retained).unwrap();
        assert!(!page.contains(r#"value="bob"""#));
        assert!(page.contains(r#"value="bob&"#));
        assert!(page.contains(r#"value="bob@example.com""#));
        assert!(page.contains("<li>Passwords do not match</li>"));

        let input = TaskInput {
            title: Some("Draft".to_string()),
            due_date: Some("2026-03-12".to_string()),
            status: Some("completed".to_string()),
            ..TaskInput::default()
        };
        let Html(page) =
            task_form_page(&user(), TaskForm::Edit(TaskId::new(3)), &input, &[]).unwrap();
        assert!(page.contains(r#"action="/tasks/edit/3""#));
        assert!(page.contains(r#"value="2026-03-12""#));
        assert!(page.contains(r#"<option value="completed" selected>"#));
        assert!(!page.contains(r#"class="errors""#));
    }

    #[test]
    fn test_navigation_follows_the_signed_in_user() {
        let Html(guest) = not_found_page(None).unwrap();
        assert!(guest.contains(r#"href="/register""#));
        assert!(!guest.contains(r#"href="/logout""#));

        let signed_in = user();
        let Html(member) = error_page(Some(&signed_in), "Failed to load tasks").unwrap();
        assert!(member.contains(r#"href="/logout""#));
        assert!(!member.contains(r#"href="/register""#));
        assert!(member.contains("Failed to load tasks"));
    }

    #[test]
    fn test_list_marks_selected_filters() {
        let query = TaskQuery::from_params(Some("completed"), Some("title"));
        let Html(page) = task_list_page(&user(), &[], query, today()).unwrap();

        assert!(page.contains(r#"<option value="completed" selected>"#));
        assert!(page.contains(r#"<option value="title" selected>"#));
        assert!(page.contains(r#"<option value="dueDate">"#));
        assert!(page.contains("No tasks yet."));
    }
}
