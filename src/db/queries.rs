//! Row-level queries
//!
//! Every function takes a plain `Connection`, so callers can run several
//! of them inside one `Transaction` (which derefs to `Connection`).
//! Reads skip soft-deleted rows.

use super::{StoreError, StoreResult};
use crate::models::{FieldDefinition, Form, FormField, FormFieldValue, FormSubmission};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const FORM_COLUMNS: &str = "id, title, created_at, updated_at, deleted_at";
const FIELD_COLUMNS: &str =
    "id, form_id, label, field_type, required, options, created_at, updated_at, deleted_at";
const SUBMISSION_COLUMNS: &str = "id, form_id, created_at, updated_at, deleted_at";
const VALUE_COLUMNS: &str =
    "id, form_submission_id, form_field_id, value, created_at, updated_at, deleted_at";

// ============ Writes ============

pub fn create_form(conn: &Connection, title: &str) -> StoreResult<Form> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO forms (title, created_at, updated_at) VALUES (?1, ?2, ?3)",
        params![title, now, now],
    )?;
    Ok(Form {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        fields: Vec::new(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    })
}

pub fn create_field(conn: &Connection, form_id: i64, def: &FieldDefinition) -> StoreResult<FormField> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO form_fields (form_id, label, field_type, required, options, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![form_id, def.label, def.field_type, def.required, def.options, now, now],
    )?;
    Ok(FormField {
        id: conn.last_insert_rowid(),
        form_id,
        label: def.label.clone(),
        field_type: def.field_type.clone(),
        required: def.required,
        options: def.options.clone(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    })
}

pub fn create_submission(conn: &Connection, form_id: i64) -> StoreResult<FormSubmission> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO form_submissions (form_id, created_at, updated_at) VALUES (?1, ?2, ?3)",
        params![form_id, now, now],
    )?;
    Ok(FormSubmission {
        id: conn.last_insert_rowid(),
        form_id,
        values: Vec::new(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    })
}

pub fn create_field_value(
    conn: &Connection,
    submission_id: i64,
    field_id: i64,
    value: &str,
) -> StoreResult<FormFieldValue> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO form_field_values (form_submission_id, form_field_id, value, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![submission_id, field_id, value, now, now],
    )?;
    Ok(FormFieldValue {
        id: conn.last_insert_rowid(),
        form_submission_id: submission_id,
        form_field_id: field_id,
        value: value.to_string(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    })
}

// ============ Reads ============

pub fn list_forms(conn: &Connection) -> StoreResult<Vec<Form>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FORM_COLUMNS} FROM forms WHERE deleted_at IS NULL ORDER BY id"
    ))?;
    let forms = stmt
        .query_map([], form_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(forms)
}

/// Form without its fields.
pub fn get_form(conn: &Connection, id: i64) -> StoreResult<Form> {
    conn.query_row(
        &format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        form_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(format!("form {id}")))
}

pub fn get_fields_for_form(conn: &Connection, form_id: i64) -> StoreResult<Vec<FormField>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FIELD_COLUMNS} FROM form_fields
         WHERE form_id = ?1 AND deleted_at IS NULL ORDER BY id"
    ))?;
    let fields = stmt
        .query_map(params![form_id], field_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(fields)
}

/// Submission without its values.
pub fn get_submission(conn: &Connection, id: i64) -> StoreResult<FormSubmission> {
    conn.query_row(
        &format!(
            "SELECT {SUBMISSION_COLUMNS} FROM form_submissions WHERE id = ?1 AND deleted_at IS NULL"
        ),
        params![id],
        submission_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(format!("submission {id}")))
}

pub fn get_values_for_submission(conn: &Connection, submission_id: i64) -> StoreResult<Vec<FormFieldValue>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VALUE_COLUMNS} FROM form_field_values
         WHERE form_submission_id = ?1 AND deleted_at IS NULL ORDER BY id"
    ))?;
    let values = stmt
        .query_map(params![submission_id], value_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(values)
}

pub fn count_submissions(conn: &Connection, form_id: i64) -> StoreResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM form_submissions WHERE form_id = ?1 AND deleted_at IS NULL",
        params![form_id],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

// ============ Row mapping ============

fn form_from_row(row: &Row<'_>) -> rusqlite::Result<Form> {
    Ok(Form {
        id: row.get(0)?,
        title: row.get(1)?,
        fields: Vec::new(),
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
        deleted_at: row.get(4)?,
    })
}

fn field_from_row(row: &Row<'_>) -> rusqlite::Result<FormField> {
    Ok(FormField {
        id: row.get(0)?,
        form_id: row.get(1)?,
        label: row.get(2)?,
        field_type: row.get(3)?,
        required: row.get(4)?,
        options: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        deleted_at: row.get(8)?,
    })
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<FormSubmission> {
    Ok(FormSubmission {
        id: row.get(0)?,
        form_id: row.get(1)?,
        values: Vec::new(),
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
        deleted_at: row.get(4)?,
    })
}

fn value_from_row(row: &Row<'_>) -> rusqlite::Result<FormFieldValue> {
    Ok(FormFieldValue {
        id: row.get(0)?,
        form_submission_id: row.get(1)?,
        form_field_id: row.get(2)?,
        value: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        deleted_at: row.get(6)?,
    })
}
