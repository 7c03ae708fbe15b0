//! Request error types

use crate::db::StoreError;
use crate::render::RenderError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Errors a request handler can end with
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::NotFound(_)) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client. Internal failures stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Store(StoreError::NotFound(what)) | AppError::NotFound(what) => {
                format!("No {what} exists.")
            }
            AppError::Validation(msg) => msg.clone(),
            AppError::Store(_) | AppError::Render(_) => "The request could not be completed.".into(),
        }
    }
}

/// A rendered error page
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub body: String,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (self.status, Html(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Store(StoreError::NotFound("form 3".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Validation("title".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Store(StoreError::Task("join".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = AppError::Store(StoreError::Task("worker panicked at db.rs".into()));
        assert!(!err.public_message().contains("db.rs"));
        assert_eq!(
            AppError::NotFound("form abc".into()).public_message(),
            "No form abc exists."
        );
    }
}
