//! SQLite-backed form store

use super::{queries, schema, Answer, FormStore, StoreError, StoreResult};
use crate::models::{Form, FormField, FormSubmission, NewForm};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const BUSY_TIMEOUT_MS: u64 = 5_000;

/// SQLite form store
///
/// One connection guarded by a mutex. Calls run on the blocking pool so
/// disk I/O never stalls the async workers.
#[derive(Clone)]
pub struct SqliteFormStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFormStore {
    /// Open (or create) the database file and migrate its schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        tracing::info!(path = %path.display(), "opened form database");
        Self::init(conn)
    }

    /// Private in-memory database, used by tests.
    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            op(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl FormStore for SqliteFormStore {
    async fn list_forms(&self) -> StoreResult<Vec<Form>> {
        self.run(|conn| queries::list_forms(conn)).await
    }

    async fn create_form_with_fields(&self, new_form: NewForm) -> StoreResult<Form> {
        let form = self
            .run(move |conn| {
                let tx = conn.transaction()?;
                let mut form = queries::create_form(&tx, &new_form.title)?;
                for def in &new_form.fields {
                    let field = queries::create_field(&tx, form.id, def)?;
                    form.fields.push(field);
                }
                tx.commit()?;
                Ok(form)
            })
            .await?;

        tracing::info!(form_id = form.id, fields = form.fields.len(), "created form");
        Ok(form)
    }

    async fn get_form_with_fields(&self, id: i64) -> StoreResult<Form> {
        self.run(move |conn| {
            let mut form = queries::get_form(conn, id)?;
            form.fields = queries::get_fields_for_form(conn, id)?;
            Ok(form)
        })
        .await
    }

    async fn get_fields_for_form(&self, form_id: i64) -> StoreResult<Vec<FormField>> {
        self.run(move |conn| queries::get_fields_for_form(conn, form_id)).await
    }

    async fn submit(&self, form_id: i64, answers: Vec<Answer>) -> StoreResult<FormSubmission> {
        let submission = self
            .run(move |conn| {
                let tx = conn.transaction()?;
                queries::get_form(&tx, form_id)?;
                let field_ids: Vec<i64> = queries::get_fields_for_form(&tx, form_id)?
                    .iter()
                    .map(|f| f.id)
                    .collect();

                let mut submission = queries::create_submission(&tx, form_id)?;
                for answer in &answers {
                    if !field_ids.contains(&answer.form_field_id) {
                        return Err(StoreError::NotFound(format!(
                            "field {} in form {form_id}",
                            answer.form_field_id
                        )));
                    }
                    let value = queries::create_field_value(
                        &tx,
                        submission.id,
                        answer.form_field_id,
                        &answer.value,
                    )?;
                    submission.values.push(value);
                }
                tx.commit()?;
                Ok(submission)
            })
            .await?;

        tracing::info!(
            form_id,
            submission_id = submission.id,
            values = submission.values.len(),
            "recorded submission"
        );
        Ok(submission)
    }

    async fn get_submission(&self, id: i64) -> StoreResult<FormSubmission> {
        self.run(move |conn| {
            let mut submission = queries::get_submission(conn, id)?;
            submission.values = queries::get_values_for_submission(conn, id)?;
            Ok(submission)
        })
        .await
    }

    async fn count_submissions(&self, form_id: i64) -> StoreResult<u64> {
        self.run(move |conn| queries::count_submissions(conn, form_id)).await
    }
}
