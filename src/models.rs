//! Form Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field type used when a row leaves the type blank
pub const DEFAULT_FIELD_TYPE: &str = "text";

// ============ Stored records ============

/// A form definition and its fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: i64,
    pub title: String,
    pub fields: Vec<FormField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One input definition belonging to a form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub id: i64,
    pub form_id: i64,
    /// Caption, and the input name submitted values are bound by
    pub label: String,
    /// Open enumeration: "text", "textarea", "select", "email", ...
    pub field_type: String,
    /// Advisory only
    pub required: bool,
    /// Comma-separated, used by "select"
    pub options: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FormField {
    /// Trimmed, non-empty entries of the comma-separated option list.
    pub fn option_list(&self) -> Vec<&str> {
        self.options
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect()
    }
}

/// One completed answer set for a form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: i64,
    pub form_id: i64,
    pub values: Vec<FormFieldValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FormSubmission {
    /// Value recorded for the given field, if any.
    pub fn value_for(&self, field_id: i64) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.form_field_id == field_id)
            .map(|v| v.value.as_str())
    }
}

/// One answer, linking a submission to the field it answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormFieldValue {
    pub id: i64,
    pub form_submission_id: i64,
    pub form_field_id: i64,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ============ Unsaved input ============

/// An unsaved field row from the authoring page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDefinition {
    pub label: String,
    pub field_type: String,
    pub required: bool,
    pub options: String,
}

impl FieldDefinition {
    pub fn new(label: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }
}

/// A form and its field rows, ready to persist as one batch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewForm {
    pub title: String,
    pub fields: Vec<FieldDefinition>,
}

impl NewForm {
    /// Assemble a form from url-encoded pairs in body order.
    ///
    /// Each `field_label` opens a row; `field_type`, `field_required` and
    /// `field_options` attach to the most recent row. A row is required only
    /// when its own checkbox key was sent. Keys may carry a `[]` suffix.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut title = String::new();
        let mut rows: Vec<FieldDefinition> = Vec::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();
            match key.strip_suffix("[]").unwrap_or(key) {
                "title" => title = value.trim().to_string(),
                "field_label" => rows.push(FieldDefinition {
                    label: value.trim().to_string(),
                    ..Default::default()
                }),
                "field_type" => {
                    if let Some(row) = rows.last_mut() {
                        row.field_type = value.trim().to_string();
                    }
                }
                "field_required" => {
                    if let Some(row) = rows.last_mut() {
                        row.required = true;
                    }
                }
                "field_options" => {
                    if let Some(row) = rows.last_mut() {
                        row.options = value.trim().to_string();
                    }
                }
                _ => {}
            }
        }

        let fields = rows
            .into_iter()
            .filter(|row| !row.label.is_empty())
            .map(|mut row| {
                if row.field_type.is_empty() {
                    row.field_type = DEFAULT_FIELD_TYPE.into();
                }
                row
            })
            .collect();

        Self { title, fields }
    }
}
