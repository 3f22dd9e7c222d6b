use axum::http::HeaderMap;
use rand::Rng;

/// Header carrying the caller's span id. `HeaderMap` stores names in
/// lowercase, so lookups against it are case-insensitive.
pub const PARENT_SPAN_HEADER: &str = "x-dpparentspanid";

/// Reads the parent span id from `headers`.
///
/// Returns 0 when the header is missing, is not visible ASCII, or is not a
/// base-10 `i64`. Extraction never fails the request.
pub fn parent_span_id(headers: &HeaderMap) -> i64 {
    headers
        .get(PARENT_SPAN_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_span_id)
        .unwrap_or(0)
}

/// Parses a decimal span id, tolerating surrounding whitespace.
pub fn parse_span_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Fresh id for the request being captured. Always positive so that 0 keeps
/// meaning "no span".
pub fn new_span_id() -> i64 {
    rand::thread_rng().gen_range(1..=i64::MAX)
}
