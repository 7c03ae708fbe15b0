//! End-to-end tests against the full router

use axum::http::StatusCode;
use axum_test::TestServer;
use formdesk::{build_router, AppState, FormStore, Renderer, SqliteFormStore};
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    server: TestServer,
    store: SqliteFormStore,
    _static_dir: TempDir,
}

fn harness() -> Harness {
    let static_dir = tempfile::tempdir().unwrap();
    std::fs::write(static_dir.path().join("style.css"), "body { margin: 0; }").unwrap();

    let store = SqliteFormStore::in_memory().unwrap();
    let state = AppState::new(Arc::new(store.clone()), Renderer::new("Test Forms").unwrap());
    let server = TestServer::new(build_router(state, static_dir.path())).unwrap();

    Harness { server, store, _static_dir: static_dir }
}

async fn create_contact_form(h: &Harness, title: &str) -> i64 {
    let response = h
        .server
        .post("/forms/create")
        .form(&[
            ("title", title),
            ("field_label", "Name"),
            ("field_type", "text"),
            ("field_label", "Email"),
            ("field_type", "text"),
        ])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");

    h.store.list_forms().await.unwrap().last().unwrap().id
}

#[tokio::test]
async fn test_create_then_view_form() {
    let h = harness();
    let id = create_contact_form(&h, "Contact").await;

    let list = h.server.get("/").await;
    list.assert_status_ok();
    assert!(list.text().contains("Contact"));

    let view = h.server.get(&format!("/forms/view/{id}")).await;
    view.assert_status_ok();
    let html = view.text();
    let name_at = html.find("name=\"Name\"").unwrap();
    let email_at = html.find("name=\"Email\"").unwrap();
    assert!(name_at < email_at);

    let form = h.store.get_form_with_fields(id).await.unwrap();
    assert_eq!(form.fields.len(), 2);
}

#[tokio::test]
async fn test_submit_records_one_value_per_field() {
    let h = harness();
    let id = create_contact_form(&h, "Contact").await;
    let fields = h.store.get_fields_for_form(id).await.unwrap();

    let response = h
        .server
        .post(&format!("/forms/submit/{id}"))
        .form(&[("Name", "Ann"), ("Email", "a@x.com")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    assert_eq!(h.store.count_submissions(id).await.unwrap(), 1);
    let submission = h.store.get_submission(1).await.unwrap();
    assert_eq!(submission.form_id, id);
    assert_eq!(submission.values.len(), 2);
    assert_eq!(submission.value_for(fields[0].id), Some("Ann"));
    assert_eq!(submission.value_for(fields[1].id), Some("a@x.com"));
}

#[tokio::test]
async fn test_shared_labels_bind_by_field_identity() {
    let h = harness();
    let first = create_contact_form(&h, "First").await;
    let second = create_contact_form(&h, "Second").await;
    let second_fields = h.store.get_fields_for_form(second).await.unwrap();

    h.server
        .post(&format!("/forms/submit/{second}"))
        .form(&[("Name", "Bea"), ("Email", "b@x.com")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    assert_eq!(h.store.count_submissions(first).await.unwrap(), 0);
    let submission = h.store.get_submission(1).await.unwrap();
    let bound: Vec<i64> = submission.values.iter().map(|v| v.form_field_id).collect();
    assert_eq!(bound, vec![second_fields[0].id, second_fields[1].id]);
    assert_eq!(submission.value_for(second_fields[0].id), Some("Bea"));
}

#[tokio::test]
async fn test_listing_is_stable() {
    let h = harness();
    for title in ["Alpha", "Beta", "Gamma"] {
        create_contact_form(&h, title).await;
    }

    let first = h.server.get("/").await.text();
    let second = h.server.get("/").await.text();
    for title in ["Alpha", "Beta", "Gamma"] {
        assert!(first.contains(title));
    }
    assert_eq!(first, second);
    assert_eq!(h.store.list_forms().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_form_is_not_found() {
    let h = harness();

    let missing = h.server.get("/forms/view/999").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert!(missing.text().contains("No form 999 exists."));

    h.server
        .get("/forms/view/abc")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // still serving
    h.server.get("/").await.assert_status_ok();
}

#[tokio::test]
async fn test_unmatched_paths_render_not_found_page() {
    let h = harness();
    for path in ["/nope", "/forms/view/", "/forms/view/1/extra"] {
        let response = h.server.get(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let html = response.text();
        assert!(html.contains("<h2>Not found</h2>"), "{path}");
        assert!(html.contains("Back to all forms"), "{path}");
    }
}

#[tokio::test]
async fn test_submit_to_unknown_form_is_not_found() {
    let h = harness();
    h.server
        .post("/forms/submit/5")
        .form(&[("Name", "Ann")])
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert_eq!(h.store.count_submissions(5).await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_on_mutating_routes_redirects() {
    let h = harness();
    let id = create_contact_form(&h, "Contact").await;

    let submit = h
        .server
        .get(&format!("/forms/submit/{id}"))
        .add_query_param("Name", "Ann")
        .await;
    submit.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(submit.header("location"), "/");
    assert_eq!(h.store.count_submissions(id).await.unwrap(), 0);

    let create = h
        .server
        .get("/forms/create")
        .add_query_param("title", "Sneaky")
        .await;
    create.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(h.store.list_forms().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_required_flag_follows_own_checkbox() {
    let h = harness();
    h.server
        .post("/forms/create")
        .form(&[
            ("title", "Survey"),
            ("field_label[]", "Optional"),
            ("field_type[]", "text"),
            ("field_label[]", "Mandatory"),
            ("field_type[]", "textarea"),
            ("field_required[]", "on"),
        ])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let id = h.store.list_forms().await.unwrap()[0].id;
    let fields = h.store.get_fields_for_form(id).await.unwrap();
    assert!(!fields[0].required);
    assert!(fields[1].required);
    assert_eq!(fields[1].field_type, "textarea");
}

#[tokio::test]
async fn test_blank_title_rejected() {
    let h = harness();
    let response = h
        .server
        .post("/forms/create")
        .form(&[("title", "  "), ("field_label", "Name")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("A form needs a title."));
    assert!(h.store.list_forms().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_new_form_page() {
    let h = harness();
    let response = h.server.get("/forms/new").await;
    response.assert_status_ok();
    assert!(response.text().contains("action=\"/forms/create\""));
}

#[tokio::test]
async fn test_static_files() {
    let h = harness();
    let css = h.server.get("/static/style.css").await;
    css.assert_status_ok();
    assert_eq!(css.text(), "body { margin: 0; }");

    h.server
        .get("/static/missing.js")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let response = h.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
