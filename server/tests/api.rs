use std::{sync::Arc, time::Duration};

use axum::{
    http::{self, Request, StatusCode},
    Router,
};
use chrono::{Days, Utc};
use http_body_util::BodyExt;
use todo_core::{Database, DocumentTodoRepository, StoreLocation, TodoService};
use todo_server::{app, dto::TodoView, in_memory_service, HttpSettings};
use tower::ServiceExt;

async fn test_app() -> Router {
    app(in_memory_service().await.unwrap(), &HttpSettings::default())
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn create(app: &Router, title: &str, active_at: &str) -> TodoView {
    let body = serde_json::json!({ "title": title, "activeAt": active_at }).to_string();
    let resp = send(app, json_request("POST", "/todo-list/tasks", &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    // keep creation timestamps apart so newest-first ordering is observable
    tokio::time::sleep(Duration::from_millis(2)).await;
    body_json(resp).await
}

// --- health ---

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let resp = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = test_app().await;
    let resp = send(&app, empty_request("GET", "/health")).await;
    assert!(resp.headers().contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me")
        .body(String::new())
        .unwrap();
    let resp = send(&app, request).await;
    assert_eq!(resp.headers()["x-request-id"], "trace-me");
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_location() {
    let app = test_app().await;
    let resp = send(
        &app,
        json_request(
            "POST",
            "/todo-list/tasks",
            r#"{"title":"Buy a book","activeAt":"2023-08-04"}"#,
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[http::header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    let todo: TodoView = body_json(resp).await;
    assert_eq!(todo.id.len(), 24);
    assert_eq!(location, format!("/todo-list/tasks/{}", todo.id));
    assert_eq!(todo.title, "Buy a book");
    assert_eq!(todo.active_at, "2023-08-04");
    assert_eq!(todo.status.as_str(), "ACTIVE");
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let app = test_app().await;
    let long_title = "a".repeat(201);
    let cases = [
        serde_json::json!({ "title": long_title, "activeAt": "2023-08-04" }).to_string(),
        r#"{"title":"Buy a book","activeAt":"2023-13-04"}"#.to_string(),
        r#"{"title":"Buy a book","activeAt":"2023-8-4"}"#.to_string(),
        r#"{"title":"","activeAt":"2023-08-04"}"#.to_string(),
        r#"{"title":"Buy a book"}"#.to_string(),
        r#"{"title":"Buy a book","#.to_string(),
    ];

    for body in cases {
        let resp = send(&app, json_request("POST", "/todo-list/tasks", &body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            resp.headers()[http::header::CONTENT_TYPE],
            "application/problem+json"
        );
    }
}

#[tokio::test]
async fn create_accepts_title_at_limit() {
    let app = test_app().await;
    let title = "a".repeat(200);
    let todo = create(&app, &title, "2023-08-04").await;
    assert_eq!(todo.title.chars().count(), 200);
}

#[tokio::test]
async fn create_duplicate_returns_409() {
    let app = test_app().await;
    create(&app, "Buy a book", "2023-08-04").await;

    let resp = send(
        &app,
        json_request(
            "POST",
            "/todo-list/tasks",
            r#"{"title":"Buy a book","activeAt":"2023-08-04"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // same title on another date is fine
    create(&app, "Buy a book", "2023-08-05").await;
}

// --- get ---

#[tokio::test]
async fn get_returns_created_todo() {
    let app = test_app().await;
    let created = create(&app, "Buy a book", "2023-08-04").await;

    let resp = send(
        &app,
        empty_request("GET", &format!("/todo-list/tasks/{}", created.id)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: TodoView = body_json(resp).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_bad_id_returns_400() {
    let app = test_app().await;
    let resp = send(&app, empty_request("GET", "/todo-list/tasks/not-an-id")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_missing_returns_empty_404() {
    let app = test_app().await;
    let resp = send(
        &app,
        empty_request("GET", "/todo-list/tasks/64cd0c3e9b1d2a3f4e5d6c7b"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- update ---

#[tokio::test]
async fn update_replaces_title_and_date() {
    let app = test_app().await;
    let created = create(&app, "Buy a book", "2023-08-04").await;
    let uri = format!("/todo-list/tasks/{}", created.id);

    let resp = send(
        &app,
        json_request("PUT", &uri, r#"{"title":"Read a book","activeAt":"2023-08-06"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let fetched: TodoView = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(fetched.title, "Read a book");
    assert_eq!(fetched.active_at, "2023-08-06");
    assert_eq!(fetched.status.as_str(), "ACTIVE");
}

#[tokio::test]
async fn update_missing_returns_404() {
    let app = test_app().await;
    let resp = send(
        &app,
        json_request(
            "PUT",
            "/todo-list/tasks/64cd0c3e9b1d2a3f4e5d6c7b",
            r#"{"title":"Read a book","activeAt":"2023-08-06"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_into_existing_pair_returns_409() {
    let app = test_app().await;
    create(&app, "Buy a book", "2023-08-04").await;
    let other = create(&app, "Read a book", "2023-08-04").await;

    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/todo-list/tasks/{}", other.id),
            r#"{"title":"Buy a book","activeAt":"2023-08-04"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn update_validates_body() {
    let app = test_app().await;
    let created = create(&app, "Buy a book", "2023-08-04").await;

    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/todo-list/tasks/{}", created.id),
            r#"{"title":"Buy a book","activeAt":"04-08-2023"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- done ---

#[tokio::test]
async fn done_listing_prefixes_weekend_titles() {
    let app = test_app().await;
    let friday = create(&app, "Buy a book", "2023-08-04").await;
    let saturday = create(&app, "Read a book", "2023-08-05").await;

    for todo in [&friday, &saturday] {
        let resp = send(
            &app,
            empty_request("PUT", &format!("/todo-list/tasks/{}/done", todo.id)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    let resp = send(&app, empty_request("GET", "/todo-list/tasks?status=done")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<TodoView> = body_json(resp).await;
    assert_eq!(todos.len(), 2);

    // newest first
    assert_eq!(todos[0].id, saturday.id);
    assert_eq!(todos[0].title, "WEEKEND — Read a book");
    assert_eq!(todos[0].status.as_str(), "DONE");
    assert_eq!(todos[1].id, friday.id);
    assert_eq!(todos[1].title, "Buy a book");

    // the prefix is display-only
    let resp = send(
        &app,
        empty_request("GET", &format!("/todo-list/tasks/{}", saturday.id)),
    )
    .await;
    let fetched: TodoView = body_json(resp).await;
    assert_eq!(fetched.title, "Read a book");

    let resp = send(&app, empty_request("GET", "/todo-list/tasks")).await;
    let active: Vec<TodoView> = body_json(resp).await;
    assert!(active.is_empty());
}

#[tokio::test]
async fn done_missing_returns_404() {
    let app = test_app().await;
    let resp = send(
        &app,
        empty_request("PUT", "/todo-list/tasks/64cd0c3e9b1d2a3f4e5d6c7b/done"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_twice_returns_404() {
    let app = test_app().await;
    let created = create(&app, "Buy a book", "2023-08-04").await;
    let uri = format!("/todo-list/tasks/{}", created.id);

    let resp = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- list ---

#[tokio::test]
async fn active_listing_hides_future_todos() {
    let app = test_app().await;
    let today = Utc::now().date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap();

    let current = create(&app, "Buy a book", &today.format("%Y-%m-%d").to_string()).await;
    create(&app, "Read a book", &tomorrow.format("%Y-%m-%d").to_string()).await;
    let past = create(&app, "Return a book", "2023-08-04").await;

    let resp = send(&app, empty_request("GET", "/todo-list/tasks")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ids: Vec<String> = body_json::<Vec<TodoView>>(resp)
        .await
        .into_iter()
        .map(|todo| todo.id)
        .collect();
    assert_eq!(ids, vec![past.id.clone(), current.id]);

    // the date criterion is replaced for active listings, the title is kept
    let resp = send(
        &app,
        empty_request(
            "GET",
            "/todo-list/tasks?status=ACTIVE&title=Return%20a%20book&activeAt=2099-01-01&activeAtOp=GT",
        ),
    )
    .await;
    let todos: Vec<TodoView> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, past.id);
}

#[tokio::test]
async fn done_listing_applies_date_operator() {
    let app = test_app().await;
    for date in ["2023-08-03", "2023-08-04", "2023-08-07"] {
        let todo = create(&app, "Buy a book", date).await;
        send(
            &app,
            empty_request("PUT", &format!("/todo-list/tasks/{}/done", todo.id)),
        )
        .await;
    }

    let resp = send(
        &app,
        empty_request(
            "GET",
            "/todo-list/tasks?status=DONE&activeAt=2023-08-04&activeAtOp=gte",
        ),
    )
    .await;
    let dates: Vec<String> = body_json::<Vec<TodoView>>(resp)
        .await
        .into_iter()
        .map(|todo| todo.active_at)
        .collect();
    assert_eq!(dates, vec!["2023-08-07", "2023-08-04"]);
}

#[tokio::test]
async fn listing_rejects_bad_parameters() {
    let app = test_app().await;
    for uri in [
        "/todo-list/tasks?status=archived",
        "/todo-list/tasks?status=DONE&activeAt=2023-08-04&activeAtOp=NE",
        "/todo-list/tasks?status=DONE&activeAt=yesterday",
        "/todo-list/tasks?status=DONE&activeAtOp=GT",
        "/todo-list/tasks?status=DONE&status=ACTIVE",
    ] {
        let resp = send(&app, empty_request("GET", uri)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(
            resp.headers()[http::header::CONTENT_TYPE],
            "application/problem+json",
            "uri: {uri}"
        );
    }
}

// --- prefix ---

#[tokio::test]
async fn routes_mount_under_url_prefix() {
    let settings = HttpSettings {
        url_prefix: "/api".to_string(),
        ..HttpSettings::default()
    };
    let app = app(in_memory_service().await.unwrap(), &settings);

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/todo-list/tasks",
            r#"{"title":"Buy a book","activeAt":"2023-08-04"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[http::header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/api/todo-list/tasks/"));

    let resp = send(&app, empty_request("GET", &location)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, empty_request("GET", "/todo-list/tasks")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, empty_request("GET", "/health")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- persistence ---

#[tokio::test]
async fn file_backed_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let location = StoreLocation::Directory(dir.path().to_path_buf());

    let service_over = |database: Database| async move {
        let repository = DocumentTodoRepository::bootstrap(&database).await.unwrap();
        Arc::new(TodoService::new(Arc::new(repository)))
    };

    let first = app(
        service_over(Database::open(&location, "todo").unwrap()).await,
        &HttpSettings::default(),
    );
    let created = create(&first, "Buy a book", "2023-08-04").await;

    let second = app(
        service_over(Database::open(&location, "todo").unwrap()).await,
        &HttpSettings::default(),
    );
    let resp = send(
        &second,
        empty_request("GET", &format!("/todo-list/tasks/{}", created.id)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: TodoView = body_json(resp).await;
    assert_eq!(fetched, created);

    let resp = send(
        &second,
        json_request(
            "POST",
            "/todo-list/tasks",
            r#"{"title":"Buy a book","activeAt":"2023-08-04"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
