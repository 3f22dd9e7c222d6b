use hdrhistogram::Histogram;
use serde::Serialize;

/// What a client has seen and kept so far. Backs `/debug/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureSummary {
    /// Requests that went through any instrumented service
    pub observed: u64,
    /// Requests that met the latency threshold
    pub captured: u64,
    /// `captured / observed`, 0 before the first request
    pub capture_ratio: f64,
    /// Captured requests that arrived with a parent span id
    pub with_parent_span: u64,
    pub without_parent_span: u64,
    /// Captured requests answered with a 5xx
    pub server_errors: u64,
    /// `None` until something is captured
    pub latency_us: Option<LatencyQuantiles>,
}

/// Latency of captured requests only, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyQuantiles {
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub max: u64,
}

impl LatencyQuantiles {
    pub(crate) fn of(hist: &Histogram<u64>) -> Option<Self> {
        (hist.len() > 0).then(|| Self {
            p50: hist.value_at_quantile(0.5),
            p90: hist.value_at_quantile(0.9),
            p99: hist.value_at_quantile(0.99),
            max: hist.max(),
        })
    }
}
