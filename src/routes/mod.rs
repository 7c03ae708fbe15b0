//! HTTP Routes

pub mod forms;
pub mod health;

use crate::db::FormStore;
use crate::error::{AppError, PageError};
use crate::render::{Renderer, View};
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Process-scoped services shared by every handler
pub struct AppState {
    pub store: Arc<dyn FormStore>,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(store: Arc<dyn FormStore>, renderer: Renderer) -> Self {
        Self { store, renderer }
    }

    /// Turn a handler failure into a rendered error page.
    pub fn page<T>(&self, result: Result<T, AppError>) -> Result<T, PageError> {
        result.map_err(|err| self.error_page(err))
    }

    fn error_page(&self, err: AppError) -> PageError {
        let status = err.status();
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        } else {
            tracing::debug!(error = %err, %status, "request rejected");
        }

        let message = err.public_message();
        let view = if status == StatusCode::NOT_FOUND {
            View::NotFound(&message)
        } else {
            View::Error(&message)
        };
        let body = self.renderer.render(view).unwrap_or_else(|e| {
            tracing::error!(error = %e, "error page failed to render");
            message.clone()
        });
        PageError { status, body }
    }
}

/// Build the application router
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(forms::list_forms))
        .route("/health", get(health::health_check))
        .nest("/forms", forms::router())
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}

/// Unmatched paths get the same not-found page as unknown records
async fn not_found(State(state): State<Arc<AppState>>, uri: Uri) -> PageError {
    state.error_page(AppError::NotFound(format!("page {}", uri.path())))
}
