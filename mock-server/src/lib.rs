//! In-memory implementation of the task API for tests and local development.
//!
//! Implements the wire protocol the core client speaks: bearer-gated JSON
//! endpoints with parameters carried in request bodies (even on GET and
//! DELETE), revision checks on mutations, and a `/batch` endpoint that
//! applies `{method, url, params}` ops in order and, when `sequential` is
//! set, stops recording results after the first failing op.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub list_id: Uuid,
    pub title: String,
    pub starred: bool,
    pub due_date: Option<String>,
    pub completed: bool,
    pub revision: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskList {
    pub id: Uuid,
    pub title: String,
    pub revision: u64,
}

#[derive(Debug, Default)]
pub struct Store {
    tasks: HashMap<Uuid, Task>,
    lists: HashMap<Uuid, TaskList>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub client_id: Option<String>,
}

#[derive(Deserialize)]
pub struct BatchEnvelope {
    pub ops: Vec<BatchOp>,
    #[serde(default)]
    pub sequential: bool,
}

#[derive(Deserialize)]
pub struct BatchOp {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub params: Value,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/lists", get(get_lists).post(add_list))
        .route(
            "/lists/{id}",
            get(get_list).patch(update_list).delete(delete_list),
        )
        .route("/tasks", get(get_tasks).post(add_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/batch", post(batch))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Any `Bearer` token is accepted; the mock only checks that one was sent.
fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer "))
}

fn parse_params(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn unauthorized() -> Response {
    reply(StatusCode::UNAUTHORIZED, json!({"error": "authorization required"}))
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

// --- handlers ---

async fn login(body: String) -> Response {
    let params = parse_params(&body);
    let input: LoginRequest = match serde_json::from_value(params) {
        Ok(input) => input,
        Err(_) => return reply(StatusCode::BAD_REQUEST, json!({"error": "malformed login"})),
    };
    if input.email.is_empty() || input.password.is_empty() {
        return reply(StatusCode::UNAUTHORIZED, json!({"error": "bad credentials"}));
    }
    reply(
        StatusCode::OK,
        json!({
            "id": Uuid::new_v4(),
            "token": Uuid::new_v4().simple().to_string(),
            "email": input.email,
        }),
    )
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    reply(
        StatusCode::OK,
        json!({"id": Uuid::new_v4(), "email": "mock@example.com"}),
    )
}

async fn get_lists(State(db): State<Db>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let store = db.read().await;
    let (status, body) = store_get_lists(&store);
    reply(status, body)
}

async fn add_list(State(db): State<Db>, headers: HeaderMap, body: String) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut store = db.write().await;
    let (status, body) = store_add_list(&mut store, &parse_params(&body));
    reply(status, body)
}

async fn get_list(State(db): State<Db>, Path(id): Path<Uuid>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let store = db.read().await;
    let (status, body) = store_get_list(&store, id);
    reply(status, body)
}

async fn update_list(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut store = db.write().await;
    let (status, body) = store_update_list(&mut store, id, &parse_params(&body));
    reply(status, body)
}

async fn delete_list(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut store = db.write().await;
    let (status, body) = store_delete_list(&mut store, id, &parse_params(&body));
    reply(status, body)
}

async fn get_tasks(State(db): State<Db>, headers: HeaderMap, body: String) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let store = db.read().await;
    let (status, body) = store_get_tasks(&store, &parse_params(&body));
    reply(status, body)
}

async fn add_task(State(db): State<Db>, headers: HeaderMap, body: String) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut store = db.write().await;
    let (status, body) = store_add_task(&mut store, &parse_params(&body));
    reply(status, body)
}

async fn get_task(State(db): State<Db>, Path(id): Path<Uuid>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let store = db.read().await;
    let (status, body) = store_get_task(&store, id);
    reply(status, body)
}

async fn update_task(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut store = db.write().await;
    let (status, body) = store_update_task(&mut store, id, &parse_params(&body));
    reply(status, body)
}

async fn delete_task(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut store = db.write().await;
    let (status, body) = store_delete_task(&mut store, id, &parse_params(&body));
    reply(status, body)
}

async fn batch(State(db): State<Db>, headers: HeaderMap, body: String) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let envelope: BatchEnvelope = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(_) => return reply(StatusCode::BAD_REQUEST, json!({"error": "malformed batch"})),
    };

    let mut store = db.write().await;
    let mut results = Vec::new();
    for op in &envelope.ops {
        let (status, body) = dispatch(&mut store, &op.method, &op.url, &op.params);
        let failed = status.as_u16() >= 300;
        results.push(json!({"status": status.as_u16(), "body": body}));
        if failed && envelope.sequential {
            break;
        }
    }
    reply(StatusCode::OK, json!({"results": results}))
}

// --- store operations, shared by route handlers and the batch dispatcher ---

fn dispatch(store: &mut Store, method: &str, url: &str, params: &Value) -> (StatusCode, Value) {
    let segments: Vec<&str> = url.trim_start_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        ("GET", ["me"]) => (
            StatusCode::OK,
            json!({"id": Uuid::new_v4(), "email": "mock@example.com"}),
        ),
        ("GET", ["tasks"]) => store_get_tasks(store, params),
        ("POST", ["tasks"]) => store_add_task(store, params),
        ("GET", ["tasks", id]) => match parse_id(id) {
            Ok(id) => store_get_task(store, id),
            Err(response) => response,
        },
        ("PATCH" | "PUT", ["tasks", id]) => match parse_id(id) {
            Ok(id) => store_update_task(store, id, params),
            Err(response) => response,
        },
        ("DELETE", ["tasks", id]) => match parse_id(id) {
            Ok(id) => store_delete_task(store, id, params),
            Err(response) => response,
        },
        ("GET", ["lists"]) => store_get_lists(store),
        ("POST", ["lists"]) => store_add_list(store, params),
        ("GET", ["lists", id]) => match parse_id(id) {
            Ok(id) => store_get_list(store, id),
            Err(response) => response,
        },
        ("PATCH" | "PUT", ["lists", id]) => match parse_id(id) {
            Ok(id) => store_update_list(store, id, params),
            Err(response) => response,
        },
        ("DELETE", ["lists", id]) => match parse_id(id) {
            Ok(id) => store_delete_list(store, id, params),
            Err(response) => response,
        },
        _ => (
            StatusCode::NOT_FOUND,
            json!({"error": format!("no such operation: {method} {url}")}),
        ),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, (StatusCode, Value)> {
    Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            json!({"error": format!("malformed id: {raw}")}),
        )
    })
}

/// Mutations that carry a `revision` must match the stored one.
fn revision_conflict(params: &Value, current: u64) -> bool {
    matches!(params.get("revision").and_then(Value::as_u64), Some(revision) if revision != current)
}

fn store_get_lists(store: &Store) -> (StatusCode, Value) {
    let lists: Vec<Value> = store.lists.values().map(to_value).collect();
    (StatusCode::OK, Value::Array(lists))
}

fn store_add_list(store: &mut Store, params: &Value) -> (StatusCode, Value) {
    let Some(title) = params.get("title").and_then(Value::as_str) else {
        return (StatusCode::BAD_REQUEST, json!({"error": "title is required"}));
    };
    let list = TaskList {
        id: Uuid::new_v4(),
        title: title.to_string(),
        revision: 1,
    };
    let body = to_value(&list);
    store.lists.insert(list.id, list);
    (StatusCode::CREATED, body)
}

fn store_get_list(store: &Store, id: Uuid) -> (StatusCode, Value) {
    match store.lists.get(&id) {
        Some(list) => (StatusCode::OK, to_value(list)),
        None => (StatusCode::NOT_FOUND, json!({"error": "list not found"})),
    }
}

fn store_update_list(store: &mut Store, id: Uuid, params: &Value) -> (StatusCode, Value) {
    let Some(list) = store.lists.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, json!({"error": "list not found"}));
    };
    if revision_conflict(params, list.revision) {
        return (StatusCode::CONFLICT, json!({"error": "revision conflict"}));
    }
    if let Some(title) = params.get("title").and_then(Value::as_str) {
        list.title = title.to_string();
    }
    list.revision += 1;
    (StatusCode::OK, to_value(list))
}

fn store_delete_list(store: &mut Store, id: Uuid, params: &Value) -> (StatusCode, Value) {
    let Some(list) = store.lists.get(&id) else {
        return (StatusCode::NOT_FOUND, json!({"error": "list not found"}));
    };
    if revision_conflict(params, list.revision) {
        return (StatusCode::CONFLICT, json!({"error": "revision conflict"}));
    }
    store.lists.remove(&id);
    store.tasks.retain(|_, task| task.list_id != id);
    (StatusCode::OK, json!({}))
}

fn store_get_tasks(store: &Store, params: &Value) -> (StatusCode, Value) {
    let list_id = params
        .get("list_id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok());
    let completed = params.get("completed").and_then(Value::as_bool);

    let tasks: Vec<Value> = store
        .tasks
        .values()
        .filter(|task| list_id.is_none_or(|id| task.list_id == id))
        .filter(|task| completed.is_none_or(|flag| task.completed == flag))
        .map(to_value)
        .collect();
    (StatusCode::OK, Value::Array(tasks))
}

fn store_add_task(store: &mut Store, params: &Value) -> (StatusCode, Value) {
    let Some(title) = params.get("title").and_then(Value::as_str) else {
        return (StatusCode::BAD_REQUEST, json!({"error": "title is required"}));
    };
    let Some(list_id) = params
        .get("list_id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
    else {
        return (StatusCode::BAD_REQUEST, json!({"error": "list_id is required"}));
    };
    if !store.lists.contains_key(&list_id) {
        return (StatusCode::NOT_FOUND, json!({"error": "list not found"}));
    }
    let task = Task {
        id: Uuid::new_v4(),
        list_id,
        title: title.to_string(),
        starred: params.get("starred").and_then(Value::as_bool).unwrap_or(false),
        due_date: params
            .get("due_date")
            .and_then(Value::as_str)
            .map(String::from),
        completed: false,
        revision: 1,
    };
    let body = to_value(&task);
    store.tasks.insert(task.id, task);
    (StatusCode::CREATED, body)
}

fn store_get_task(store: &Store, id: Uuid) -> (StatusCode, Value) {
    match store.tasks.get(&id) {
        Some(task) => (StatusCode::OK, to_value(task)),
        None => (StatusCode::NOT_FOUND, json!({"error": "task not found"})),
    }
}

fn store_update_task(store: &mut Store, id: Uuid, params: &Value) -> (StatusCode, Value) {
    let Some(task) = store.tasks.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, json!({"error": "task not found"}));
    };
    if revision_conflict(params, task.revision) {
        return (StatusCode::CONFLICT, json!({"error": "revision conflict"}));
    }
    if let Some(title) = params.get("title").and_then(Value::as_str) {
        task.title = title.to_string();
    }
    if let Some(due_date) = params.get("due_date").and_then(Value::as_str) {
        task.due_date = Some(due_date.to_string());
    }
    if let Some(completed) = params.get("completed").and_then(Value::as_bool) {
        task.completed = completed;
    }
    if let Some(starred) = params.get("starred").and_then(Value::as_bool) {
        task.starred = starred;
    }
    task.revision += 1;
    (StatusCode::OK, to_value(task))
}

fn store_delete_task(store: &mut Store, id: Uuid, params: &Value) -> (StatusCode, Value) {
    let Some(task) = store.tasks.get(&id) else {
        return (StatusCode::NOT_FOUND, json!({"error": "task not found"}));
    };
    if revision_conflict(params, task.revision) {
        return (StatusCode::CONFLICT, json!({"error": "revision conflict"}));
    }
    store.tasks.remove(&id);
    (StatusCode::OK, json!({}))
}
