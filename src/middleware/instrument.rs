use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::Request;
use axum::http;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use tower::{Layer, Service};

use crate::client::Client;
use crate::span;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// What the wrapper copies out of a request before handing it on.
/// Only borrowed reads: the request and its body reach the inner service
/// untouched.
pub(crate) struct Observation {
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) parent_span_id: i64,
}

impl Observation {
    fn from_request<B>(req: &http::Request<B>) -> Self {
        Self {
            timestamp: Utc::now(),
            method: req.method().to_string(),
            path: req.uri().path().to_owned(),
            parent_span_id: span::parent_span_id(req.headers()),
        }
    }
}

/// A service wrapped with latency capture.
///
/// Times the inner service from `call` until its future resolves, then lets
/// the owning [`Client`] decide whether to buffer and report the request.
/// The inner response (or error) is returned exactly as produced.
#[derive(Clone)]
pub struct Instrumented<S> {
    inner: S,
    client: Client,
}

impl<S> Instrumented<S> {
    pub(crate) fn new(inner: S, client: Client) -> Self {
        Self { inner, client }
    }
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for Instrumented<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
{
    type Response = http::Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        let observed = Observation::from_request(&req);
        let client = self.client.clone();

        let start = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let result = fut.await;
            let elapsed = start.elapsed();

            // Errors pass through uncaptured: there is no status to report
            if let Ok(res) = &result {
                client.record(observed, elapsed, res.status());
            }
            result
        })
    }
}

/// `tower::Layer` producing [`Instrumented`] services.
#[derive(Clone)]
pub struct InstrumentLayer {
    client: Client,
}

impl InstrumentLayer {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

impl<S> Layer<S> for InstrumentLayer {
    type Service = Instrumented<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Instrumented::new(inner, self.client.clone())
    }
}

/// Adapts an `async fn(Request) -> impl IntoResponse` into a service.
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    pub(crate) fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut, R> Service<Request> for HandlerFn<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let fut = (self.f)(req);
        Box::pin(async move { Ok(fut.await.into_response()) })
    }
}
