//! End-to-end tests for the responder.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use imhost::host::{FixedHostname, HostnameProvider};
use imhost::http::{BodySink, ServeError, SinkFactory, X_REQUEST_ID};

mod common;

struct FailingHostname;

impl HostnameProvider for FailingHostname {
    fn hostname(&self) -> io::Result<String> {
        Err(io::Error::other("forced error"))
    }
}

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "forced error"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl BodySink for BrokenSink {
    fn into_bytes(self: Box<Self>) -> Vec<u8> {
        Vec::new()
    }
}

struct BrokenSinks;

impl SinkFactory for BrokenSinks {
    fn open(&self) -> Box<dyn BodySink> {
        Box::new(BrokenSink)
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_greets_with_hostname() {
    let responder = common::start_responder(Arc::new(FixedHostname::new("replica-a"))).await;

    let res = client().get(responder.url()).send().await.expect("Responder unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Hello from host: replica-a\n");

    responder.shutdown.trigger();
    assert!(responder.handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_any_method_and_path() {
    let responder = common::start_responder(Arc::new(FixedHostname::new("replica-b"))).await;
    let client = client();

    let res = client
        .post(format!("{}/some/deep/path?x=1", responder.url()))
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Hello from host: replica-b"));

    let res = client
        .delete(format!("{}/other", responder.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    responder.shutdown.trigger();
}

#[tokio::test]
async fn test_hostname_failure_returns_500() {
    let responder = common::start_responder(Arc::new(FailingHostname)).await;

    let res = client().get(responder.url()).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.text().await.unwrap();
    assert_eq!(body, "failed to get hostname. error: forced error");

    // The server keeps running after a lookup failure.
    let res = client().get(responder.url()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    responder.shutdown.trigger();
    assert!(responder.handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_request_id_is_assigned_and_echoed() {
    let responder = common::start_responder(Arc::new(FixedHostname::new("replica-c"))).await;
    let client = client();

    let res = client.get(responder.url()).send().await.unwrap();
    let generated = res.headers().get(X_REQUEST_ID).expect("missing x-request-id");
    assert!(!generated.is_empty());

    let res = client
        .get(responder.url())
        .header(X_REQUEST_ID, "caller-chosen-id")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get(X_REQUEST_ID).unwrap(), "caller-chosen-id");

    responder.shutdown.trigger();
}

#[tokio::test]
async fn test_unrecoverable_error_stops_server() {
    let responder = common::start_responder(Arc::new(FixedHostname::new("replica-d"))).await;

    responder
        .fatal
        .report(ServeError::Unrecoverable(io::Error::other("forced error")));

    let outcome = tokio::time::timeout(Duration::from_secs(5), responder.handle)
        .await
        .expect("server did not stop")
        .unwrap();

    let err = outcome.unwrap_err();
    assert!(err.is_unrecoverable());
    assert!(err.to_string().contains("forced error"));
}

#[tokio::test]
async fn test_body_write_failure_stops_server() {
    let responder = common::start_responder_with_sinks(
        Arc::new(FixedHostname::new("replica-f")),
        Arc::new(BrokenSinks),
    )
    .await;

    // The request itself may see a 500 or a closed connection.
    if let Ok(res) = client().get(responder.url()).send().await {
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    let outcome = tokio::time::timeout(Duration::from_secs(5), responder.handle)
        .await
        .expect("server did not stop")
        .unwrap();

    let err = outcome.unwrap_err();
    assert!(err.is_unrecoverable());
    assert!(err.to_string().contains("forced error"));
}

#[tokio::test]
async fn test_concurrent_requests() {
    let responder = common::start_responder(Arc::new(FixedHostname::new("replica-e"))).await;
    let client = client();

    let concurrency = 20;
    let requests_per_task = 25;

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = responder.url();
        tasks.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..requests_per_task {
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() {
                        ok += 1;
                    }
                }
            }
            ok
        }));
    }

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }

    assert_eq!(total, concurrency * requests_per_task);

    responder.shutdown.trigger();
}
