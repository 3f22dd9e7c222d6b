use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::middleware::instrument::{HandlerFn, InstrumentLayer, Instrumented, Observation};
use crate::reporter::Reporter;
use crate::sampler::{should_capture, LatencyThreshold};
use crate::span;
use crate::stats::{CaptureSummary, CapturedEntry, StatBuffer};

/// Owns the configuration, the captured-entry buffer and the reporter for
/// one instrumented service. Clones share all of it.
///
/// There is no process-wide instance: build one per service (or per test)
/// and hand it to whatever needs to wrap handlers.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    latency_threshold: LatencyThreshold,
    /// Every request that completed through an instrumented service
    observed: AtomicU64,
    buffer: StatBuffer,
    reporter: Reporter,
}

impl Client {
    /// Client with default collector URL and threshold.
    ///
    /// Must be called inside a Tokio runtime; the reporter task is spawned
    /// here.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        Self::with_config(ClientConfig::new(token))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;
        let reporter = Reporter::spawn(&config)?;

        Ok(Self {
            inner: Arc::new(Inner {
                latency_threshold: config.latency_threshold,
                observed: AtomicU64::new(0),
                buffer: StatBuffer::new(),
                reporter,
            }),
        })
    }

    pub fn latency_threshold(&self) -> LatencyThreshold {
        self.inner.latency_threshold
    }

    /// Every entry captured through this client, in capture order.
    pub fn buffer(&self) -> &StatBuffer {
        &self.inner.buffer
    }

    /// Observed vs captured counts and latency of what was captured.
    pub fn summary(&self) -> CaptureSummary {
        self.inner
            .buffer
            .summary(self.inner.observed.load(Ordering::Relaxed))
    }

    /// Wrap a plain async handler function.
    ///
    /// ```ignore
    /// let app = Router::new().route("/", any_service(client.wrap_fn(|req: Request| async move {
    ///     "hello"
    /// })));
    /// ```
    pub fn wrap_fn<F, Fut, R>(&self, handler: F) -> Instrumented<HandlerFn<F>>
    where
        F: Fn(Request) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.wrap_service(HandlerFn::new(handler))
    }

    /// Wrap any `tower::Service` that turns a request into a response: an
    /// axum `Router`, `Handler::into_service`, a hand-written service.
    pub fn wrap_service<S>(&self, service: S) -> Instrumented<S> {
        Instrumented::new(service, self.clone())
    }

    /// Same instrumentation as a `tower::Layer`, for `Router::layer`.
    pub fn layer(&self) -> InstrumentLayer {
        InstrumentLayer::new(self.clone())
    }

    /// Give queued reports up to `window` to go out, then stop the reporter.
    /// Returns `false` if some were still pending when the window closed.
    ///
    /// Entries captured after this call are still buffered but no longer
    /// reported.
    pub async fn shutdown(&self, window: Duration) -> bool {
        self.inner.reporter.drain(window).await
    }

    /// Apply the sampling policy to a finished request and, if it qualifies,
    /// buffer it and queue it for delivery. Never blocks on the network.
    pub(crate) fn record(&self, observed: Observation, elapsed: Duration, status: StatusCode) {
        self.inner.observed.fetch_add(1, Ordering::Relaxed);
        if !should_capture(elapsed, self.inner.latency_threshold) {
            return;
        }

        let entry = Arc::new(CapturedEntry {
            timestamp: observed.timestamp,
            duration_micros: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            parent_span_id: observed.parent_span_id,
            span_id: span::new_span_id(),
            path: observed.path,
            method: observed.method,
            status_code: status.as_u16(),
        });

        debug!(
            method = %entry.method,
            path = %entry.path,
            duration_us = entry.duration_micros,
            parent_span_id = entry.parent_span_id,
            "request captured"
        );

        self.inner.buffer.push(entry.clone());
        self.inner.reporter.enqueue(entry);
    }
}
