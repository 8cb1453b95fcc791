use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Task, TaskList};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, "Bearer test-token")
        .body(body.to_string())
        .unwrap()
}

fn anon_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- login ---

#[tokio::test]
async fn login_returns_id_and_token() {
    let app = app();
    let resp = app
        .oneshot(anon_request(
            "POST",
            "/login",
            r#"{"email":"a@b.c","password":"pw"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["id"].as_str().is_some());
}

#[tokio::test]
async fn login_rejects_blank_credentials() {
    let app = app();
    let resp = app
        .oneshot(anon_request(
            "POST",
            "/login",
            r#"{"email":"a@b.c","password":""}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- auth gate ---

#[tokio::test]
async fn tasks_require_authorization() {
    let app = app();
    let resp = app
        .oneshot(anon_request("GET", "/tasks", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn batch_requires_authorization() {
    let app = app();
    let resp = app
        .oneshot(anon_request(
            "POST",
            "/batch",
            r#"{"ops":[],"sequential":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- lists and tasks ---

#[tokio::test]
async fn list_and_task_lifecycle() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(authed_request("POST", "/lists", r#"{"title":"inbox"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let list: TaskList = body_json(resp).await;
    assert_eq!(list.title, "inbox");
    assert_eq!(list.revision, 1);

    let create_body = json!({"title": "Buy milk", "list_id": list.id, "starred": true}).to_string();
    let resp = app
        .clone()
        .oneshot(authed_request("POST", "/tasks", &create_body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Task = body_json(resp).await;
    assert_eq!(task.title, "Buy milk");
    assert!(task.starred);

    let resp = app
        .clone()
        .oneshot(authed_request("GET", &format!("/tasks/{}", task.id), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Task = body_json(resp).await;
    assert_eq!(fetched.id, task.id);

    let resp = app
        .clone()
        .oneshot(authed_request(
            "PATCH",
            &format!("/tasks/{}", task.id),
            r#"{"completed":true,"revision":1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = body_json(resp).await;
    assert!(updated.completed);
    assert_eq!(updated.revision, 2);

    let resp = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/tasks/{}", task.id),
            r#"{"revision":2}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn get_missing_task_is_404() {
    let app = app();
    let resp = app
        .oneshot(authed_request("GET", &format!("/tasks/{}", Uuid::new_v4()), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stale_revision_is_409() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(authed_request("POST", "/lists", r#"{"title":"inbox"}"#))
        .await
        .unwrap();
    let list: TaskList = body_json(resp).await;

    let resp = app
        .oneshot(authed_request(
            "PATCH",
            &format!("/lists/{}", list.id),
            r#"{"title":"new","revision":7}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// --- batch ---

#[tokio::test]
async fn batch_applies_ops_in_order() {
    let app = app();
    let envelope = json!({
        "ops": [
            {"method": "POST", "url": "/lists", "params": {"title": "inbox"}},
            {"method": "GET", "url": "/lists", "params": {}},
        ],
        "sequential": true,
    })
    .to_string();

    let resp = app
        .oneshot(authed_request("POST", "/batch", &envelope))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["status"], json!(201));
    // The list created by the first op is visible to the second.
    assert_eq!(results[1]["status"], json!(200));
    assert_eq!(results[1]["body"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sequential_batch_halts_at_first_failure() {
    let app = app();
    let envelope = json!({
        "ops": [
            {"method": "GET", "url": "/lists", "params": {}},
            {"method": "GET", "url": format!("/tasks/{}", Uuid::new_v4()), "params": {}},
            {"method": "GET", "url": "/lists", "params": {}},
        ],
        "sequential": true,
    })
    .to_string();

    let resp = app
        .oneshot(authed_request("POST", "/batch", &envelope))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["status"], json!(404));
}

#[tokio::test]
async fn non_sequential_batch_reports_every_op() {
    let app = app();
    let envelope = json!({
        "ops": [
            {"method": "GET", "url": format!("/tasks/{}", Uuid::new_v4()), "params": {}},
            {"method": "GET", "url": "/lists", "params": {}},
        ],
        "sequential": false,
    })
    .to_string();

    let resp = app
        .oneshot(authed_request("POST", "/batch", &envelope))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["status"], json!(404));
    assert_eq!(results[1]["status"], json!(200));
}

#[tokio::test]
async fn empty_batch_returns_empty_results() {
    let app = app();
    let resp = app
        .oneshot(authed_request(
            "POST",
            "/batch",
            r#"{"ops":[],"sequential":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["results"], json!([]));
}
