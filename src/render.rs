//! Page rendering
//!
//! Handlebars templates under `templates/` are compiled into the binary and
//! registered once at startup. Every page wraps itself in the `layout`
//! partial; handlebars escapes interpolated values.

use crate::models::{Form, FormField};
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Blank field rows on the authoring page
pub const BLANK_FIELD_ROWS: usize = 5;

/// Field types offered on the authoring page
pub const FIELD_TYPES: &[&str] = &["text", "textarea", "select", "email", "number", "date", "checkbox"];

const LAYOUT: &str = include_str!("../templates/layout.hbs");

const TEMPLATES: &[(&str, &str)] = &[
    ("list", include_str!("../templates/list.hbs")),
    ("new", include_str!("../templates/new.hbs")),
    ("view", include_str!("../templates/view.hbs")),
    ("not_found", include_str!("../templates/not_found.hbs")),
    ("error", include_str!("../templates/error.hbs")),
];

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("invalid renderer setting: {0}")]
    Invalid(String),
}

/// A page and the data it renders
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    FormList(&'a [Form]),
    NewForm,
    FormDetail { form: &'a Form, submissions: u64 },
    NotFound(&'a str),
    Error(&'a str),
}

impl View<'_> {
    /// Registered template name
    pub fn name(&self) -> &'static str {
        match self {
            View::FormList(_) => "list",
            View::NewForm => "new",
            View::FormDetail { .. } => "view",
            View::NotFound(_) => "not_found",
            View::Error(_) => "error",
        }
    }

    fn data(&self) -> serde_json::Value {
        match *self {
            View::FormList(forms) => json!({ "page_title": "All forms", "forms": forms }),
            View::NewForm => json!({
                "page_title": "New form",
                "rows": (0..BLANK_FIELD_ROWS).collect::<Vec<_>>(),
                "field_types": FIELD_TYPES,
            }),
            View::FormDetail { form, submissions } => {
                let fields: Vec<FieldInput<'_>> = form.fields.iter().map(FieldInput::from).collect();
                json!({
                    "page_title": form.title,
                    "form": form,
                    "fields": fields,
                    "submissions_label": format!(
                        "{} submission{} received",
                        submissions,
                        if submissions == 1 { "" } else { "s" }
                    ),
                })
            }
            View::NotFound(message) => json!({ "page_title": "Not found", "message": message }),
            View::Error(message) => json!({ "page_title": "Error", "message": message }),
        }
    }
}

/// A stored field plus the control the detail page draws for it
#[derive(Serialize)]
struct FieldInput<'a> {
    #[serde(flatten)]
    field: &'a FormField,
    is_textarea: bool,
    is_select: bool,
    choices: Vec<&'a str>,
}

impl<'a> From<&'a FormField> for FieldInput<'a> {
    fn from(field: &'a FormField) -> Self {
        Self {
            field,
            is_textarea: field.field_type == "textarea",
            is_select: field.field_type == "select",
            choices: field.option_list(),
        }
    }
}

// "2024-05-01T09:30:12.345Z" -> "2024-05-01 09:30"
handlebars_helper!(short_date: |ts: str| ts.get(..16).unwrap_or(ts).replace('T', " "));

/// HTML renderer, built once at startup
pub struct Renderer {
    handlebars: Handlebars<'static>,
    site_title: String,
}

impl Renderer {
    /// Register every page template. A template that fails to parse is a
    /// startup error.
    pub fn new(site_title: impl Into<String>) -> Result<Self, RenderError> {
        let site_title = site_title.into();
        if site_title.trim().is_empty() {
            return Err(RenderError::Invalid("site title is empty".into()));
        }

        let mut hb = Handlebars::new();
        hb.register_helper("short_date", Box::new(short_date));
        register_templates(&mut hb, TEMPLATES)?;

        Ok(Self { handlebars: hb, site_title })
    }

    /// Render a full HTML document.
    pub fn render(&self, view: View<'_>) -> Result<String, RenderError> {
        tracing::trace!(view = view.name(), "rendering");
        let mut data = view.data();
        data["site_title"] = json!(self.site_title);
        Ok(self.handlebars.render(view.name(), &data)?)
    }
}

fn register_templates(hb: &mut Handlebars<'static>, templates: &[(&str, &str)]) -> Result<(), RenderError> {
    hb.register_partial("layout", LAYOUT)?;
    for (name, source) in templates {
        hb.register_template_string(name, source)?;
    }
    Ok(())
}
