use std::time::Duration;

/// Default threshold: only requests slower than this get reported.
pub const DEFAULT_LATENCY_THRESHOLD: Duration = Duration::from_millis(500);

/// Minimum latency a request needs before it is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyThreshold {
    /// Capture every request regardless of latency.
    Always,
    /// Capture requests whose latency is at least this long.
    AtLeast(Duration),
}

impl LatencyThreshold {
    /// Builds a threshold from signed milliseconds. Any negative value
    /// means "capture unconditionally".
    pub fn from_millis(ms: i64) -> Self {
        if ms < 0 {
            Self::Always
        } else {
            Self::AtLeast(Duration::from_millis(ms as u64))
        }
    }
}

impl Default for LatencyThreshold {
    fn default() -> Self {
        Self::AtLeast(DEFAULT_LATENCY_THRESHOLD)
    }
}

impl From<Duration> for LatencyThreshold {
    fn from(d: Duration) -> Self {
        Self::AtLeast(d)
    }
}

/// Decides whether a request that took `elapsed` should be captured.
pub fn should_capture(elapsed: Duration, threshold: LatencyThreshold) -> bool {
    match threshold {
        LatencyThreshold::Always => true,
        LatencyThreshold::AtLeast(min) => elapsed >= min,
    }
}
