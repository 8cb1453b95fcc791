//! End-to-end tests against the live mock server.
//!
//! Starts the mock server on a random port on a background thread, then
//! drives a real [`Session`] (ureq transport) through login, single-request
//! execution, and batching, verifying the wire behavior the unit tests only
//! simulate.

use std::time::Duration;

use serde_json::Value;
use tasklist_core::{catalog, ApiError, ApiRequest, HttpMethod, Session};
use uuid::Uuid;

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn logged_in_session(base: &str) -> Session {
    let mut session = Session::new(base).with_retry_delay(Duration::from_millis(10));
    let user = session.login("user@example.com", "hunter2").unwrap();
    assert!(!user.token.is_empty());
    assert!(session.is_authenticated());
    session
}

fn parse_uuid(value: &Value) -> Uuid {
    Uuid::parse_str(value.as_str().unwrap()).unwrap()
}

#[test]
fn login_execute_and_batch_lifecycle() {
    let base = start_server();
    let session = logged_in_session(&base);
    let at = |request: ApiRequest| request.with_server(&base);

    // Create a list, then two tasks in it.
    let list = session.execute(&at(catalog::add_list("inbox"))).unwrap();
    let list_id = parse_uuid(&list["id"]);

    let task_a = session
        .execute(&at(catalog::add_task("alpha", list_id, None, false)))
        .unwrap();
    let task_b = session
        .execute(&at(catalog::add_task("beta", list_id, Some("2026-09-01"), true)))
        .unwrap();
    let id_a = parse_uuid(&task_a["id"]);
    let id_b = parse_uuid(&task_b["id"]);

    // Single execute round-trips a task.
    let fetched = session.execute(&at(catalog::get_task(id_a))).unwrap();
    assert_eq!(fetched["title"], "alpha");

    // Batching two gets yields both bodies in input order.
    let results: Vec<_> = session
        .send_batch(&[at(catalog::get_task(id_b)), at(catalog::get_task(id_a))])
        .unwrap()
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap()["title"], "beta");
    assert_eq!(results[1].as_ref().unwrap()["title"], "alpha");

    // Mutations flow through the batch too, carrying revisions.
    let mut results = session
        .send_batch(&[
            at(catalog::complete_task(id_a, 1)),
            at(catalog::get_task(id_a)),
        ])
        .unwrap();
    assert_eq!(results.next().unwrap().unwrap()["completed"], true);
    assert_eq!(results.next().unwrap().unwrap()["completed"], true);
    assert!(results.next().is_none());

    // Delete and observe the 404 surface after the scoped retry.
    session.execute(&at(catalog::delete_task(id_b, 1))).unwrap();
    let err = session.execute(&at(catalog::get_task(id_b))).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));
}

#[test]
fn batch_halts_at_first_failing_operation() {
    let base = start_server();
    let session = logged_in_session(&base);
    let at = |request: ApiRequest| request.with_server(&base);

    let list = session.execute(&at(catalog::add_list("inbox"))).unwrap();
    let list_id = parse_uuid(&list["id"]);
    let task = session
        .execute(&at(catalog::add_task("alpha", list_id, None, false)))
        .unwrap();
    let task_id = parse_uuid(&task["id"]);

    let mut results = session
        .send_batch(&[
            at(catalog::get_task(task_id)),
            at(catalog::get_task(Uuid::new_v4())),
            at(catalog::get_task(task_id)),
        ])
        .unwrap();

    assert_eq!(results.next().unwrap().unwrap()["title"], "alpha");
    match results.next().unwrap().unwrap_err() {
        ApiError::BatchItem { index, status } => {
            assert_eq!(index, 1);
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(results.next().is_none());
}

#[test]
fn empty_batch_yields_nothing() {
    let base = start_server();
    let session = logged_in_session(&base);
    let mut results = session.send_batch(&[]).unwrap();
    assert!(results.next().is_none());
}

#[test]
fn foreign_origin_descriptor_cannot_be_batched() {
    let base = start_server();
    let session = logged_in_session(&base);
    let err = session
        .send_batch(&[catalog::get_comments(Uuid::new_v4())])
        .unwrap_err();
    assert!(matches!(err, ApiError::Configuration(_)));
}

#[test]
fn unauthenticated_request_is_rejected() {
    let base = start_server();
    let session = Session::new(&base);
    let request = ApiRequest::new(HttpMethod::Get, "/lists", None).with_server(&base);
    let err = session.execute(&request).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }));
}

#[test]
fn bad_credentials_fail_login_without_storing_a_token() {
    let base = start_server();
    let mut session = Session::new(&base);
    let err = session.login("user@example.com", "").unwrap_err();
    assert!(matches!(err, ApiError::Auth { status: 401 }));
    assert!(!session.is_authenticated());
}

#[test]
fn adopted_token_authorizes_requests() {
    let base = start_server();
    let mut session = Session::new(&base);
    session.adopt_token("recycled-token");
    let lists = session
        .execute(&ApiRequest::new(HttpMethod::Get, "/lists", None).with_server(&base))
        .unwrap();
    assert_eq!(lists, serde_json::json!([]));
}
