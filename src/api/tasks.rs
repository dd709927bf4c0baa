use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::validation::parse_task_id;
use super::views::{self, TaskForm};
use super::{ApiError, ApiResponse, AppState, ListParams, PageError, StatusUpdate};
use crate::domain::{TaskId, TaskInput, TaskQuery};
use crate::services::{SessionUser, TaskError};

use super::error::TASK_NOT_FOUND_PAGE;

fn page_id(raw: &str) -> Result<TaskId, PageError> {
    parse_task_id(raw).ok_or_else(|| PageError::NotFound(TASK_NOT_FOUND_PAGE.to_string()))
}

/// GET /tasks
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Html<String>, PageError> {
    let tasks = state.tasks();
    let stats = tasks
        .dashboard(&user.owner())
        .await
        .map_err(|e| PageError::from_task(e, "Failed to load dashboard"))?;

    Ok(views::dashboard_page(&user, &stats, tasks.today())?)
}

/// GET /tasks/list?status=&sort=
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, PageError> {
    let query = TaskQuery::from_params(params.status.as_deref(), params.sort.as_deref());
    let tasks = state.tasks();
    let items = tasks
        .list(&user.owner(), query)
        .await
        .map_err(|e| PageError::from_task(e, "Failed to load tasks"))?;

    Ok(views::task_list_page(&user, &items, query, tasks.today())?)
}

/// GET /tasks/add
pub async fn add_form(
    Extension(user): Extension<SessionUser>,
) -> Result<Html<String>, PageError> {
    Ok(views::task_form_page(
        &user,
        TaskForm::Add,
        &TaskInput::default(),
        &[],
    )?)
}

/// POST /tasks/add
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Form(input): Form<TaskInput>,
) -> Result<Response, PageError> {
    match state.tasks().create(&user.owner(), input).await {
        Ok(_) => Ok(Redirect::to("/tasks").into_response()),
        Err(TaskError::Validation { errors, input }) => {
            let page = views::task_form_page(&user, TaskForm::Add, &input, &errors)?;
            Ok(page.into_response())
        }
        Err(e) => Err(PageError::from_task(e, "Failed to create task")),
    }
}

/// GET /tasks/edit/{id}
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let id = page_id(&raw_id)?;
    let task = state
        .tasks()
        .get_for_edit(&user.owner(), id)
        .await
        .map_err(|e| PageError::from_task(e, "Failed to load task"))?;

    Ok(views::task_form_page(
        &user,
        TaskForm::Edit(id),
        &TaskInput::from_task(&task),
        &[],
    )?)
}

/// POST /tasks/edit/{id}
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(raw_id): Path<String>,
    Form(input): Form<TaskInput>,
) -> Result<Response, PageError> {
    let id = page_id(&raw_id)?;

    match state.tasks().update(&user.owner(), id, input).await {
        Ok(()) => Ok(Redirect::to("/tasks").into_response()),
        Err(TaskError::Validation { errors, input }) => {
            let page = views::task_form_page(&user, TaskForm::Edit(id), &input, &errors)?;
            Ok(page.into_response())
        }
        Err(e) => Err(PageError::from_task(e, "Failed to update task")),
    }
}

/// POST /tasks/delete/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let id = parse_task_id(&raw_id).ok_or_else(ApiError::task_not_found)?;
    state.tasks().delete(&user.owner(), id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /tasks/status/{id} with `{"status": "pending" | "completed"}`
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(raw_id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(update) = payload.map_err(|_| ApiError::validation("Invalid status"))?;

    let id = parse_task_id(&raw_id).ok_or_else(ApiError::task_not_found)?;
    state
        .tasks()
        .set_status(&user.owner(), id, &update.status)
        .await?;

    Ok(Json(ApiResponse::ok()))
}
