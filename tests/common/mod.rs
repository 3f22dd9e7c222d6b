//! Shared helpers: a mock stats collector and client builders.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Router,
};
use deferstats::{Client, ClientConfig, LatencyThreshold};
use parking_lot::Mutex;
use tokio::net::TcpListener;

pub const TOKEN: &str = "token";
pub const SPAN_ID: i64 = 8103318854963911860;

/// One POST as seen by the collector.
#[derive(Debug, Clone)]
pub struct Received {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct CollectorState {
    status: StatusCode,
    delay: Duration,
    received: Arc<Mutex<Vec<Received>>>,
}

/// Mock collector listening on an ephemeral loopback port.
pub struct Collector {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Received>>>,
}

impl Collector {
    /// Accepts every report with 200 straight away.
    pub async fn start() -> Self {
        Self::start_with(StatusCode::OK, Duration::ZERO).await
    }

    /// Answers every report with `status` after sleeping `delay`.
    pub async fn start_with(status: StatusCode, delay: Duration) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = CollectorState {
            status,
            delay,
            received: received.clone(),
        };

        let app = Router::new().fallback(collect).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, received }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().clone()
    }

    /// Poll until at least `n` reports have arrived or `timeout` passes.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> Vec<Received> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let got = self.received();
            if got.len() >= n || tokio::time::Instant::now() >= deadline {
                return got;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn collect(
    State(state): State<CollectorState>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    tokio::time::sleep(state.delay).await;

    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    state.received.lock().push(Received {
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
    });

    state.status
}

/// Client that captures every request and reports to `stats_url`.
pub fn always_client(stats_url: &str) -> Client {
    Client::with_config(
        ClientConfig::new(TOKEN)
            .stats_url(stats_url)
            .latency_threshold(LatencyThreshold::Always),
    )
    .unwrap()
}

/// Loopback address where nothing listens.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/";
