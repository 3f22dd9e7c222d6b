use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    Json,
};
use deferstats::{CaptureSummary, CapturedEntry, Client};
use serde::Serialize;
use serde_json::{json, Value};

/// How many entries `/debug/stats` returns
const RECENT_ENTRIES: usize = 50;

// ─── GET / ───────────────────────────────────────────────────────

pub async fn index(req: Request) -> String {
    format!("{} {}\n", req.method(), req.uri().path())
}

// ─── POST /api/echo ──────────────────────────────────────────────

/// Returns the JSON body it was sent, plus the headers it saw.
pub async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let seen: serde_json::Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.to_string(), Value::from(value)))
        })
        .collect();

    Json(json!({
        "headers": seen,
        "body": body,
    }))
}

// ─── GET /api/slow ───────────────────────────────────────────────

/// Deliberately slower than the default threshold so it always gets
/// captured.
pub async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_millis(600)).await;
    "done\n"
}

// ─── GET /debug/stats ────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatsSnapshot {
    pub summary: CaptureSummary,
    pub recent: Vec<CapturedEntry>,
}

pub async fn stats(State(client): State<Client>) -> Json<StatsSnapshot> {
    Json(StatsSnapshot {
        summary: client.summary(),
        recent: client
            .buffer()
            .recent(RECENT_ENTRIES)
            .iter()
            .map(|entry| CapturedEntry::clone(entry))
            .collect(),
    })
}
