pub mod buffer;
pub mod summary;

pub use buffer::StatBuffer;
pub use summary::{CaptureSummary, LatencyQuantiles};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One sampled request. This is also the JSON body posted to the collector.
///
/// Entries are shared as `Arc<CapturedEntry>` between the buffer and the
/// reporter and never mutated after capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedEntry {
    /// Wall-clock time the request was first observed
    pub timestamp: DateTime<Utc>,
    /// Time spent inside the wrapped handler (μs)
    pub duration_micros: u64,
    /// Caller's span id, 0 when none was sent
    pub parent_span_id: i64,
    /// Id assigned to this request
    pub span_id: i64,
    pub path: String,
    pub method: String,
    /// Status of the response the wrapped handler produced
    pub status_code: u16,
}
