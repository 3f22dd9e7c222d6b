//! Latency sampling for axum/tower services.
//!
//! A [`Client`] wraps request handlers, times each call, reads the caller's
//! span id from `X-DPParentSpanId`, and for requests at or above its latency
//! threshold appends a [`CapturedEntry`] to its [`StatBuffer`] and posts the
//! entry to a collector in the background. The wrapped handler sees the
//! request exactly as it arrived, and its response is returned unchanged.
//!
//! Delivery is best-effort: one POST per entry, no retry, and anything still
//! queued at process exit is lost unless [`Client::shutdown`] is awaited.

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod reporter;
pub mod sampler;
pub mod span;
pub mod stats;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_STATS_URL};
pub use error::{DeliveryError, Error};
pub use middleware::{HandlerFn, InstrumentLayer, Instrumented};
pub use sampler::{should_capture, LatencyThreshold};
pub use span::{parent_span_id, PARENT_SPAN_HEADER};
pub use stats::{CaptureSummary, CapturedEntry, LatencyQuantiles, StatBuffer};
