use std::sync::Arc;

use hdrhistogram::Histogram;
use parking_lot::Mutex;

use super::summary::{CaptureSummary, LatencyQuantiles};
use super::CapturedEntry;

// ─── Configuration ───────────────────────────────────────────────

/// HdrHistogram range: 1 μs → 60 s, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

// ─── Public types ────────────────────────────────────────────────

/// Append-only store of every entry a client has captured.
///
/// Instrumented handlers call `push()` from many tasks at once; a single
/// mutex serialises appends so none are lost and insertion order is the
/// order in which appends completed. Nothing is ever evicted.
pub struct StatBuffer {
    inner: Mutex<Inner>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    entries: Vec<Arc<CapturedEntry>>,
    latency_hist: Histogram<u64>,
    with_parent_span: u64,
    server_errors: u64,
}

// ─── StatBuffer impl ─────────────────────────────────────────────

impl StatBuffer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Append a captured entry.
    pub fn push(&self, entry: Arc<CapturedEntry>) {
        self.inner.lock().push(entry);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th captured entry, oldest first.
    pub fn get(&self, index: usize) -> Option<Arc<CapturedEntry>> {
        self.inner.lock().entries.get(index).cloned()
    }

    /// Copy of every entry captured so far, oldest first.
    pub fn snapshot(&self) -> Vec<Arc<CapturedEntry>> {
        self.inner.lock().entries.clone()
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Arc<CapturedEntry>> {
        let inner = self.inner.lock();
        let start = inner.entries.len().saturating_sub(n);
        inner.entries[start..].to_vec()
    }

    /// Roll up the captured entries against the `observed` request count
    /// the owning client has seen.
    pub(crate) fn summary(&self, observed: u64) -> CaptureSummary {
        let inner = self.inner.lock();
        let captured = inner.entries.len() as u64;
        CaptureSummary {
            observed,
            captured,
            capture_ratio: if observed > 0 {
                captured as f64 / observed as f64
            } else {
                0.0
            },
            with_parent_span: inner.with_parent_span,
            without_parent_span: captured - inner.with_parent_span,
            server_errors: inner.server_errors,
            latency_us: LatencyQuantiles::of(&inner.latency_hist),
        }
    }
}

impl Default for StatBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            latency_hist: Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
                .expect("histogram creation"),
            with_parent_span: 0,
            server_errors: 0,
        }
    }

    fn push(&mut self, entry: Arc<CapturedEntry>) {
        // Clamp to ≥ 1 μs; anything past 60 s lands in the top bucket
        self.latency_hist
            .saturating_record(entry.duration_micros.max(HIST_LOW));
        if entry.parent_span_id != 0 {
            self.with_parent_span += 1;
        }
        if entry.status_code >= 500 {
            self.server_errors += 1;
        }
        self.entries.push(entry);
    }
}
