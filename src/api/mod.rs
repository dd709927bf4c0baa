use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::services::{AuthService, TaskService};
use crate::state::SharedState;

mod assets;
pub mod auth;
mod error;
mod observability;
mod tasks;
mod types;
mod validation;
pub mod views;

pub use error::{ApiError, PageError};
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn tasks(&self) -> &TaskService {
        &self.shared.task_service
    }

    #[must_use]
    pub fn auth(&self) -> &dyn AuthService {
        self.shared.auth_service.as_ref()
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_http_only(true)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(i64::from(
            server.session_inactivity_minutes,
        ))));

    let task_routes = Router::new()
        .route("/tasks", get(tasks::dashboard))
        .route("/tasks/list", get(tasks::list))
        .route("/tasks/add", get(tasks::add_form).post(tasks::add))
        .route("/tasks/edit/{id}", get(tasks::edit_form).post(tasks::edit))
        .route("/tasks/delete/{id}", post(tasks::delete))
        .route("/tasks/status/{id}", post(tasks::set_status))
        .route_layer(middleware::from_fn(auth::require_login));

    let guest_routes = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route_layer(middleware::from_fn(auth::redirect_if_logged_in));

    Router::new()
        .merge(task_routes)
        .merge(guest_routes)
        .route("/", get(auth::home))
        .route("/logout", get(auth::logout))
        .route("/metrics", get(observability::get_metrics))
        .route("/static/{*path}", get(assets::serve_asset))
        .fallback(assets::not_found)
        .layer(middleware::from_fn(error::render_error_pages))
        .layer(session_layer)
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
