//! Pure request constructors for every API resource.
//!
//! # Design
//! Each function shapes arguments into an [`ApiRequest`] and nothing more —
//! no I/O, no session state. The session and the batch coordinator treat
//! these descriptors exactly like hand-built ones. Mutating calls carry the
//! entity's `revision` so the server can reject stale writes.
//!
//! Comment endpoints live on a separate origin ([`COMMENTS_URL`]); they can
//! be executed individually but not batched through the primary API.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::http::HttpMethod;
use crate::request::{ApiRequest, COMMENTS_URL};

fn object(entries: Vec<(&str, Value)>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

// --- auth / user ---

/// Login request. `client_id` is required by later server generations and
/// omitted for earlier ones.
pub fn login(email: &str, password: &str, client_id: Option<&str>) -> ApiRequest {
    let mut body = object(vec![("email", json!(email)), ("password", json!(password))]);
    if let Some(client_id) = client_id {
        body.insert("client_id".to_string(), json!(client_id));
    }
    ApiRequest::new(HttpMethod::Post, "/login", Some(body))
}

/// Information about the logged-in user.
pub fn me() -> ApiRequest {
    ApiRequest::new(HttpMethod::Get, "/me", None)
}

// --- tasks ---

/// Tasks in a list, optionally only the completed ones.
pub fn get_tasks(list_id: Uuid, completed: bool) -> ApiRequest {
    let body = object(vec![
        ("list_id", json!(list_id)),
        ("completed", json!(completed)),
    ]);
    ApiRequest::new(HttpMethod::Get, "/tasks", Some(body))
}

pub fn get_task(task_id: Uuid) -> ApiRequest {
    ApiRequest::new(HttpMethod::Get, format!("/tasks/{task_id}"), None)
}

/// Create a task. `due_date` is an ISO-8601 date string.
pub fn add_task(title: &str, list_id: Uuid, due_date: Option<&str>, starred: bool) -> ApiRequest {
    let mut body = object(vec![
        ("list_id", json!(list_id)),
        ("title", json!(title)),
        ("starred", json!(starred)),
    ]);
    if let Some(due_date) = due_date {
        body.insert("due_date".to_string(), json!(due_date));
    }
    ApiRequest::new(HttpMethod::Post, "/tasks", Some(body))
}

pub fn set_task_title(task_id: Uuid, title: &str, revision: u64) -> ApiRequest {
    let body = object(vec![("title", json!(title)), ("revision", json!(revision))]);
    ApiRequest::new(HttpMethod::Patch, format!("/tasks/{task_id}"), Some(body))
}

pub fn set_task_due_date(task_id: Uuid, due_date: &str, revision: u64) -> ApiRequest {
    let body = object(vec![
        ("due_date", json!(due_date)),
        ("revision", json!(revision)),
    ]);
    ApiRequest::new(HttpMethod::Patch, format!("/tasks/{task_id}"), Some(body))
}

pub fn complete_task(task_id: Uuid, revision: u64) -> ApiRequest {
    let body = object(vec![
        ("completed", json!(true)),
        ("revision", json!(revision)),
    ]);
    ApiRequest::new(HttpMethod::Patch, format!("/tasks/{task_id}"), Some(body))
}

pub fn delete_task(task_id: Uuid, revision: u64) -> ApiRequest {
    let body = object(vec![("revision", json!(revision))]);
    ApiRequest::new(HttpMethod::Delete, format!("/tasks/{task_id}"), Some(body))
}

// --- lists ---

pub fn get_lists() -> ApiRequest {
    ApiRequest::new(HttpMethod::Get, "/lists", None)
}

pub fn get_list(list_id: Uuid) -> ApiRequest {
    ApiRequest::new(HttpMethod::Get, format!("/lists/{list_id}"), None)
}

pub fn add_list(title: &str) -> ApiRequest {
    let body = object(vec![("title", json!(title))]);
    ApiRequest::new(HttpMethod::Post, "/lists", Some(body))
}

pub fn set_list_title(list_id: Uuid, title: &str, revision: u64) -> ApiRequest {
    let body = object(vec![("title", json!(title)), ("revision", json!(revision))]);
    ApiRequest::new(HttpMethod::Patch, format!("/lists/{list_id}"), Some(body))
}

pub fn delete_list(list_id: Uuid, revision: u64) -> ApiRequest {
    let body = object(vec![("revision", json!(revision))]);
    ApiRequest::new(HttpMethod::Delete, format!("/lists/{list_id}"), Some(body))
}

// --- notes ---

pub fn get_notes(task_id: Uuid) -> ApiRequest {
    let body = object(vec![("task_id", json!(task_id))]);
    ApiRequest::new(HttpMethod::Get, "/notes", Some(body))
}

pub fn set_note_for_task(task_id: Uuid, content: &str) -> ApiRequest {
    let body = object(vec![
        ("task_id", json!(task_id)),
        ("content", json!(content)),
    ]);
    ApiRequest::new(HttpMethod::Post, "/notes", Some(body))
}

pub fn update_note(note_id: Uuid, content: &str, revision: u64) -> ApiRequest {
    let body = object(vec![
        ("content", json!(content)),
        ("revision", json!(revision)),
    ]);
    ApiRequest::new(HttpMethod::Patch, format!("/notes/{note_id}"), Some(body))
}

pub fn delete_note(note_id: Uuid) -> ApiRequest {
    ApiRequest::new(HttpMethod::Delete, format!("/notes/{note_id}"), None)
}

// --- reminders ---

pub fn get_reminders(task_id: Uuid) -> ApiRequest {
    let body = object(vec![("task_id", json!(task_id))]);
    ApiRequest::new(HttpMethod::Get, "/reminders", Some(body))
}

/// Add a reminder. `date` is an ISO-8601 date-time string.
pub fn set_reminder_for_task(task_id: Uuid, date: &str) -> ApiRequest {
    let body = object(vec![("task_id", json!(task_id)), ("date", json!(date))]);
    ApiRequest::new(HttpMethod::Post, "/reminders", Some(body))
}

pub fn update_reminder(reminder_id: Uuid, date: &str, revision: u64) -> ApiRequest {
    let body = object(vec![("date", json!(date)), ("revision", json!(revision))]);
    ApiRequest::new(HttpMethod::Patch, format!("/reminders/{reminder_id}"), Some(body))
}

pub fn delete_reminder(reminder_id: Uuid, revision: u64) -> ApiRequest {
    let body = object(vec![("revision", json!(revision))]);
    ApiRequest::new(HttpMethod::Delete, format!("/reminders/{reminder_id}"), Some(body))
}

// --- subtasks ---

pub fn get_subtasks(task_id: Uuid, completed: bool) -> ApiRequest {
    let body = object(vec![
        ("task_id", json!(task_id)),
        ("completed", json!(completed)),
    ]);
    ApiRequest::new(HttpMethod::Get, "/subtasks", Some(body))
}

pub fn add_subtask(task_id: Uuid, title: &str) -> ApiRequest {
    let body = object(vec![
        ("task_id", json!(task_id)),
        ("title", json!(title)),
        ("completed", json!(false)),
    ]);
    ApiRequest::new(HttpMethod::Post, "/subtasks", Some(body))
}

pub fn complete_subtask(subtask_id: Uuid, revision: u64, completed: bool) -> ApiRequest {
    let body = object(vec![
        ("completed", json!(completed)),
        ("revision", json!(revision)),
    ]);
    ApiRequest::new(HttpMethod::Patch, format!("/subtasks/{subtask_id}"), Some(body))
}

pub fn delete_subtask(subtask_id: Uuid, revision: u64) -> ApiRequest {
    let body = object(vec![("revision", json!(revision))]);
    ApiRequest::new(HttpMethod::Delete, format!("/subtasks/{subtask_id}"), Some(body))
}

// --- comments (separate origin) ---

pub fn get_comments(task_id: Uuid) -> ApiRequest {
    ApiRequest::new(HttpMethod::Get, format!("/tasks/{task_id}/messages"), None)
        .with_server(COMMENTS_URL)
}

pub fn add_comment(task_id: Uuid, text: &str) -> ApiRequest {
    let body = object(vec![
        ("channel_id", json!(task_id)),
        ("channel_type", json!("tasks")),
        ("text", json!(text)),
    ]);
    ApiRequest::new(HttpMethod::Post, format!("/tasks/{task_id}/messages"), Some(body))
        .with_server(COMMENTS_URL)
}
