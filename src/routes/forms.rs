//! Form authoring and submission endpoints

use super::AppState;
use crate::db::Answer;
use crate::error::{AppError, PageError};
use crate::models::{FormField, NewForm};
use crate::render::View;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, Uri};
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use url::form_urlencoded;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/new", get(new_form))
        .route("/create", post(create_form).fallback(redirect_to_list))
        .route("/view/:id", get(view_form))
        .route("/submit/:id", post(submit_form).fallback(redirect_to_list))
}

/// List all forms
pub async fn list_forms(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    state.page(list_page(&state).await).map(Html)
}

/// Blank authoring page
pub async fn new_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    state.page(state.renderer.render(View::NewForm).map_err(AppError::from)).map(Html)
}

/// Create a form and its fields, then return to the list
pub async fn create_form(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Redirect, PageError> {
    state.page(store_new_form(&state, &body).await)?;
    Ok(Redirect::to("/"))
}

/// Form detail page with its submission controls
pub async fn view_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    state.page(detail_page(&state, &id).await).map(Html)
}

/// Record one submission, then return to the list
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Redirect, PageError> {
    state.page(store_submission(&state, &id, &body).await)?;
    Ok(Redirect::to("/"))
}

/// Mutating routes answer any other method with a redirect and no side effects.
pub async fn redirect_to_list(method: Method, uri: Uri) -> Redirect {
    tracing::debug!(%method, %uri, "non-POST request to mutating route");
    Redirect::to("/")
}

async fn list_page(state: &AppState) -> Result<String, AppError> {
    let forms = state.store.list_forms().await?;
    Ok(state.renderer.render(View::FormList(&forms))?)
}

async fn store_new_form(state: &AppState, body: &[u8]) -> Result<(), AppError> {
    let new_form = NewForm::from_pairs(form_urlencoded::parse(body));
    if new_form.title.is_empty() {
        return Err(AppError::Validation("A form needs a title.".into()));
    }
    state.store.create_form_with_fields(new_form).await?;
    Ok(())
}

async fn detail_page(state: &AppState, id: &str) -> Result<String, AppError> {
    let form_id = parse_form_id(id)?;
    let form = state.store.get_form_with_fields(form_id).await?;
    let submissions = state.store.count_submissions(form_id).await?;
    Ok(state.renderer.render(View::FormDetail { form: &form, submissions })?)
}

async fn store_submission(state: &AppState, id: &str, body: &[u8]) -> Result<(), AppError> {
    let form_id = parse_form_id(id)?;
    let fields = state.store.get_fields_for_form(form_id).await?;
    let answers = bind_answers(&fields, form_urlencoded::parse(body));
    state.store.submit(form_id, answers).await?;
    Ok(())
}

/// Ids are the raw path remainder; anything that is not an integer names no form.
fn parse_form_id(id: &str) -> Result<i64, AppError> {
    id.parse().map_err(|_| AppError::NotFound(format!("form {id}")))
}

/// One answer per field, keyed by the field's label. The first posted value
/// wins; a missing key records an empty answer.
fn bind_answers<I, K, V>(fields: &[FormField], pairs: I) -> Vec<Answer>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let posted: Vec<(K, V)> = pairs.into_iter().collect();
    fields
        .iter()
        .map(|field| {
            let value = posted
                .iter()
                .find(|(key, _)| key.as_ref() == field.label)
                .map(|(_, value)| value.as_ref().to_string())
                .unwrap_or_default();
            Answer::new(field.id, value)
        })
        .collect()
}
