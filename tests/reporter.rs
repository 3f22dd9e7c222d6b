//! Background delivery to the collector.

use std::time::Duration;

use axum::{body::Body, extract::Request, http::StatusCode};
use tower::ServiceExt;

mod common;
use common::{always_client, Collector, SPAN_ID};

fn spanned(path: &str) -> Request {
    Request::builder()
        .method("PUT")
        .uri(path)
        .header("x-dpparentspanid", SPAN_ID.to_string())
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn posts_entry_as_json_with_bearer_token() {
    let collector = Collector::start().await;
    let client = always_client(&collector.url());
    let svc = client.wrap_fn(|_req: Request| async { StatusCode::CREATED });

    svc.oneshot(spanned("/things/1")).await.unwrap();

    let received = collector.wait_for(1, Duration::from_secs(5)).await;
    assert_eq!(received.len(), 1);

    let report = &received[0];
    assert_eq!(report.authorization.as_deref(), Some("Bearer token"));
    assert_eq!(report.content_type.as_deref(), Some("application/json"));

    let entry = client.buffer().get(0).unwrap();
    let body = &report.body;
    assert_eq!(body["path"], "/things/1");
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["parent_span_id"].as_i64(), Some(SPAN_ID));
    assert_eq!(body["span_id"].as_i64(), Some(entry.span_id));
    assert_eq!(body["duration_micros"].as_u64(), Some(entry.duration_micros));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn one_post_per_captured_entry() {
    let collector = Collector::start().await;
    let client = always_client(&collector.url());
    let svc = client.wrap_fn(|_req: Request| async { "ok" });

    for i in 0..3 {
        svc.clone().oneshot(spanned(&format!("/{i}"))).await.unwrap();
    }

    let received = collector.wait_for(3, Duration::from_secs(5)).await;
    let mut paths: Vec<_> = received
        .iter()
        .map(|r| r.body["path"].as_str().unwrap().to_owned())
        .collect();
    paths.sort();
    assert_eq!(paths, ["/0", "/1", "/2"]);
}

#[tokio::test]
async fn rejected_reports_do_not_stop_the_reporter() {
    let collector = Collector::start_with(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
    let client = always_client(&collector.url());
    let svc = client.wrap_fn(|_req: Request| async { "ok" });

    svc.clone().oneshot(spanned("/first")).await.unwrap();
    svc.oneshot(spanned("/second")).await.unwrap();

    // Both reach the collector even though each one was refused
    let received = collector.wait_for(2, Duration::from_secs(5)).await;
    assert_eq!(received.len(), 2);
    assert_eq!(client.buffer().len(), 2);
}

#[tokio::test]
async fn shutdown_drains_queued_reports() {
    let collector = Collector::start().await;
    let client = always_client(&collector.url());
    let svc = client.wrap_fn(|_req: Request| async { "ok" });

    for i in 0..5 {
        svc.clone().oneshot(spanned(&format!("/{i}"))).await.unwrap();
    }

    assert!(client.shutdown(Duration::from_secs(5)).await);
    assert_eq!(collector.received().len(), 5);

    // After shutdown entries are still buffered, just no longer sent
    svc.oneshot(spanned("/late")).await.unwrap();
    assert_eq!(client.buffer().len(), 6);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(collector.received().len(), 5);

    // A second shutdown has nothing left to wait for
    assert!(client.shutdown(Duration::from_millis(10)).await);
}

#[tokio::test]
async fn overlapping_shutdowns_both_complete() {
    let collector = Collector::start().await;
    let client = always_client(&collector.url());
    let svc = client.wrap_fn(|_req: Request| async { "ok" });

    for i in 0..3 {
        svc.clone().oneshot(spanned(&format!("/{i}"))).await.unwrap();
    }

    let (first, second) = tokio::join!(
        client.shutdown(Duration::from_secs(5)),
        client.shutdown(Duration::from_secs(5)),
    );
    assert!(first);
    assert!(second);
    assert_eq!(collector.received().len(), 3);
}

#[tokio::test]
async fn shutdown_gives_up_after_the_window() {
    let collector = Collector::start_with(StatusCode::OK, Duration::from_secs(2)).await;
    let client = always_client(&collector.url());
    let svc = client.wrap_fn(|_req: Request| async { "ok" });

    svc.oneshot(spanned("/stuck")).await.unwrap();

    assert!(!client.shutdown(Duration::from_millis(100)).await);
}
