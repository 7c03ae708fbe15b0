//! Form Store - persistence for forms, fields, submissions and values
//!
//! The store works with whole aggregates:
//! - a form is written together with all of its fields
//! - a submission is written together with all of its values
//!
//! Each aggregate write is one SQLite transaction.

pub mod queries;
pub mod schema;
mod sqlite;

pub use sqlite::SqliteFormStore;

use crate::models::{Form, FormField, FormSubmission, NewForm};
use async_trait::async_trait;

/// Store result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// One submitted answer, bound to the field it answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub form_field_id: i64,
    pub value: String,
}

impl Answer {
    pub fn new(form_field_id: i64, value: impl Into<String>) -> Self {
        Self { form_field_id, value: value.into() }
    }
}

/// Form Store trait
#[async_trait]
pub trait FormStore: Send + Sync {
    /// All forms in creation order, without their fields
    async fn list_forms(&self) -> StoreResult<Vec<Form>>;

    /// Create a form and all of its fields atomically
    async fn create_form_with_fields(&self, form: NewForm) -> StoreResult<Form>;

    /// Get a form with its fields eagerly loaded
    async fn get_form_with_fields(&self, id: i64) -> StoreResult<Form>;

    /// Fields of a form in creation order
    async fn get_fields_for_form(&self, form_id: i64) -> StoreResult<Vec<FormField>>;

    /// Record a submission and all of its values atomically
    async fn submit(&self, form_id: i64, answers: Vec<Answer>) -> StoreResult<FormSubmission>;

    /// Get a submission with its values
    async fn get_submission(&self, id: i64) -> StoreResult<FormSubmission>;

    async fn count_submissions(&self, form_id: i64) -> StoreResult<u64>;
}
