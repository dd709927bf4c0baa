use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::fmt;
use tower_sessions::Session;

use super::ApiResponse;
use super::auth::current_user;
use super::views;
use crate::services::TaskError;

/// Failure of a JSON endpoint.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound => Self::task_not_found(),
            TaskError::InvalidStatus(_) => Self::validation("Invalid status"),
            TaskError::Validation { errors, .. } => Self::validation(errors.join(", ")),
            TaskError::Store(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl ApiError {
    #[must_use]
    pub fn task_not_found() -> Self {
        Self::NotFound("Task not found".to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

pub const TASK_NOT_FOUND_PAGE: &str = "Task not found or you do not have permission to edit it";

/// Failure of an HTML endpoint; rendered as the error page.
#[derive(Debug)]
pub enum PageError {
    NotFound(String),

    BadRequest(String),

    /// Detail goes to the log; the page shows `public` only.
    Internal { public: &'static str, detail: String },

    Template(askama::Error),
}

impl PageError {
    pub fn internal(public: &'static str, detail: impl fmt::Display) -> Self {
        Self::Internal {
            public,
            detail: detail.to_string(),
        }
    }

    /// Maps a task failure, using `public` as the page text for store errors.
    #[must_use]
    pub fn from_task(err: TaskError, public: &'static str) -> Self {
        match err {
            TaskError::NotFound => Self::NotFound(TASK_NOT_FOUND_PAGE.to_string()),
            TaskError::InvalidStatus(_) => Self::BadRequest("Invalid status".to_string()),
            TaskError::Validation { errors, .. } => Self::BadRequest(errors.join(", ")),
            TaskError::Store(detail) => Self::Internal { public, detail },
        }
    }
}

impl From<askama::Error> for PageError {
    fn from(err: askama::Error) -> Self {
        Self::Template(err)
    }
}

/// Page an error response still needs, attached as a response extension and
/// turned into HTML by [`render_error_pages`].
#[derive(Debug, Clone)]
pub enum ErrorPage {
    Message(String),
    MissingRoute,
}

impl ErrorPage {
    #[must_use]
    pub fn respond(self, status: StatusCode) -> Response {
        let mut response = status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal { public, detail } => {
                tracing::error!("{}: {}", public, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, public.to_string())
            }
            Self::Template(err) => {
                tracing::error!(error = %err, "Template rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to render page".to_string(),
                )
            }
        };

        ErrorPage::Message(message).respond(status)
    }
}

/// Renders pending [`ErrorPage`]s with the navigation of whoever is signed in.
pub async fn render_error_pages(session: Session, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let Some(page) = response.extensions_mut().remove::<ErrorPage>() else {
        return response;
    };

    let user = current_user(&session).await;
    let rendered = match &page {
        ErrorPage::Message(message) => views::error_page(user.as_ref(), message),
        ErrorPage::MissingRoute => views::not_found_page(user.as_ref()),
    };

    match rendered {
        Ok(html) => (response.status(), html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render error page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
