use axum::{
    Form,
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::safe_return_path;
use super::{AppState, PageError, views};
use crate::domain::{LoginInput, RegistrationInput, RetainedFields};
use crate::services::{AuthError, SessionUser};

pub const USER_KEY: &str = "user";
pub const RETURN_TO_KEY: &str = "return_to";

pub(super) async fn current_user(session: &Session) -> Option<SessionUser> {
    session.get::<SessionUser>(USER_KEY).await.ok().flatten()
}

/// Starts a fresh session for `user`, so the pre-login session id is never
/// reused after authentication.
async fn establish(session: &Session, user: &SessionUser) -> Result<Option<String>, PageError> {
    let return_to = session
        .remove::<String>(RETURN_TO_KEY)
        .await
        .map_err(|e| PageError::internal("Failed to create session", e))?;

    session
        .cycle_id()
        .await
        .map_err(|e| PageError::internal("Failed to create session", e))?;
    session
        .insert(USER_KEY, user)
        .await
        .map_err(|e| PageError::internal("Failed to create session", e))?;

    Ok(return_to)
}

// ============================================================================
// Middleware
// ============================================================================

/// Lets only signed-in users through and hands the session identity to the
/// handler as an extension. Anyone else is sent to `/login`; for page loads
/// the requested path is remembered for after login.
pub async fn require_login(session: Session, mut request: Request, next: Next) -> Response {
    if let Some(user) = current_user(&session).await {
        tracing::Span::current().record("user_id", user.id.as_str());
        request.extensions_mut().insert(user);
        return next.run(request).await;
    }

    if request.method() == Method::GET {
        let path = request
            .uri()
            .path_and_query()
            .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
        if let Err(e) = session.insert(RETURN_TO_KEY, path).await {
            tracing::warn!(error = %e, "Failed to remember requested path");
        }
    }

    Redirect::to("/login").into_response()
}

/// Sends signed-in users away from the login and registration pages.
pub async fn redirect_if_logged_in(session: Session, request: Request, next: Next) -> Response {
    if current_user(&session).await.is_some() {
        return Redirect::to("/tasks").into_response();
    }

    next.run(request).await
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn home(session: Session) -> Redirect {
    if current_user(&session).await.is_some() {
        Redirect::to("/tasks")
    } else {
        Redirect::to("/login")
    }
}

/// GET /login
pub async fn login_page() -> Result<Html<String>, PageError> {
    Ok(views::login_page(&[], &RetainedFields::default())?)
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(payload): Form<LoginInput>,
) -> Result<Response, PageError> {
    match state.auth().login(&payload).await {
        Ok(user) => {
            let return_to = establish(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");

            let target = return_to
                .as_deref()
                .and_then(safe_return_path)
                .unwrap_or("/tasks");
            Ok(Redirect::to(target).into_response())
        }
        Err(err @ (AuthError::Database(_) | AuthError::Internal(_))) => {
            Err(PageError::internal("Login failed", err))
        }
        Err(err) => {
            let page =
                views::login_page(&err.user_messages(), &RetainedFields::from(&payload))?;
            Ok(page.into_response())
        }
    }
}

/// GET /register
pub async fn register_page() -> Result<Html<String>, PageError> {
    Ok(views::register_page(&[], &RetainedFields::default())?)
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(payload): Form<RegistrationInput>,
) -> Result<Response, PageError> {
    match state.auth().register(&payload).await {
        Ok(user) => {
            establish(&session, &user).await?;
            Ok(Redirect::to("/tasks").into_response())
        }
        Err(err @ (AuthError::Database(_) | AuthError::Internal(_))) => {
            Err(PageError::internal("Registration failed", err))
        }
        Err(err) => {
            let page =
                views::register_page(&err.user_messages(), &RetainedFields::from(&payload))?;
            Ok(page.into_response())
        }
    }
}

/// GET /logout
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to clear session");
    }
    Redirect::to("/login")
}
