//! End-to-end route contract tests: the full router is built exactly as the
//! binary builds it (zero browse delay by default) and driven with one-shot
//! requests. Each test constructs its own app, so no state leaks between
//! tests; clones of one app share its stores.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookshop_kernel::settings::Settings;
use bookshop_kernel::ModuleRegistry;

fn app() -> Router {
    let settings = Settings::default();
    let mut registry = ModuleRegistry::new();
    bookshop_app::modules::register_all(&mut registry, &settings);
    bookshop_http::build_router(&registry, &settings)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_responds() {
    let app = app();
    let request = Request::builder()
        .method("GET")
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_books_returns_full_seed_catalog() {
    let app = app();
    let (status, body) = send(&app, "GET", "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 10);
    assert_eq!(books[0]["title"], "Things Fall Apart");
    assert_eq!(books[0]["reviews"], json!({}));
}

#[tokio::test]
async fn get_book_by_isbn() {
    let app = app();

    let (status, body) = send(&app, "GET", "/isbn/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author"], "Chinua Achebe");

    let (status, body) = send(&app, "GET", "/isbn/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Book not found");
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["details"], json!([]));
    assert!(body["error"]["trace_id"].is_string());
    assert!(body["error"]["timestamp"].is_string());
}

#[tokio::test]
async fn author_search_normalizes_query_and_reports_count() {
    let app = app();

    let (status, body) = send(&app, "GET", "/author/%20ACHEBE%20", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["books"][0]["id"], "1");

    let (status, body) = send(&app, "GET", "/author/melville", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "No books found by this author");
}

#[tokio::test]
async fn title_search_matches_substrings() {
    let app = app();

    let (status, body) = send(&app, "GET", "/title/pride", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Pride and Prejudice");

    let (status, _) = send(&app, "GET", "/title/moby%20dick", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reviews_for_unreviewed_book_use_sentinel_not_error() {
    let app = app();

    let (status, body) = send(&app, "GET", "/review/2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No reviews available for this book");
    assert_eq!(body["reviews"], json!({}));

    let (status, _) = send(&app, "GET", "/review/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_conflicts_and_missing_fields() {
    let app = app();

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "alice", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same username, different password: still a conflict
    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "alice", "password": "pw2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Username already exists");

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_issues_token_bound_to_username() {
    let app = app();
    let token = register_and_login(&app, "alice", "pw1").await;

    // The token's claim resolves to alice: a review written with it lands
    // under alice's name.
    let (status, body) = send(
        &app,
        "PUT",
        "/auth/review/1",
        Some(&token),
        Some(json!({ "review": "a classic" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reviews"]["alice"], "a classic");
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_missing_fields() {
    let app = app();
    register_and_login(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid login credentials");

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "nobody", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn review_mutation_requires_a_valid_session() {
    let app = app();

    let (status, _) = send(
        &app,
        "PUT",
        "/auth/review/1",
        None,
        Some(json!({ "review": "anonymous" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "PUT",
        "/auth/review/1",
        Some("not.a.token"),
        Some(json!({ "review": "forged" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn review_lifecycle_upsert_overwrite_delete() {
    let app = app();
    let token = register_and_login(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/auth/review/1",
        Some(&token),
        Some(json!({ "review": "a classic" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Review added/updated successfully");
    assert_eq!(body["reviews"]["alice"], "a classic");

    // Overwrite, not append
    let (status, body) = send(
        &app,
        "PUT",
        "/auth/review/1",
        Some(&token),
        Some(json!({ "review": "changed my mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reviews"]["alice"], "changed my mind");
    assert_eq!(body["reviews"].as_object().unwrap().len(), 1);

    // Visible to the public read
    let (status, body) = send(&app, "GET", "/review/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reviews"]["alice"], "changed my mind");

    let (status, body) = send(&app, "DELETE", "/auth/review/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Review deleted successfully");
    assert!(body["reviews"].as_object().unwrap().is_empty());

    // Deleting the now-absent review is an error, not a no-op
    let (status, _) = send(&app, "DELETE", "/auth/review/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn review_upsert_validates_book_and_text() {
    let app = app();
    let token = register_and_login(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/auth/review/999",
        Some(&token),
        Some(json!({ "review": "ghost book" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Book not found");

    let (status, body) = send(
        &app,
        "PUT",
        "/auth/review/1",
        Some(&token),
        Some(json!({ "review": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Review cannot be empty");
}

#[tokio::test]
async fn delete_leaves_other_users_reviews_in_place() {
    let app = app();
    let alice = register_and_login(&app, "alice", "pw1").await;
    let bob = register_and_login(&app, "bob", "pw2").await;

    send(
        &app,
        "PUT",
        "/auth/review/1",
        Some(&alice),
        Some(json!({ "review": "a classic" })),
    )
    .await;
    send(
        &app,
        "PUT",
        "/auth/review/1",
        Some(&bob),
        Some(json!({ "review": "slow start" })),
    )
    .await;

    let (status, body) = send(&app, "DELETE", "/auth/review/1", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reviews"].get("alice").is_none());
    assert_eq!(body["reviews"]["bob"], "slow start");
}
