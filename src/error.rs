use std::num::ParseIntError;

use reqwest::StatusCode;
use thiserror::Error;

/// Setup errors. These surface from `Client` construction and config
/// loading and are meant to stop the process at startup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("stats token is empty (set DEFERSTATS_TOKEN)")]
    MissingToken,

    #[error("invalid latency threshold {value:?}: {source}")]
    InvalidThreshold {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to build stats HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("deferstats client must be created inside a Tokio runtime")]
    NoRuntime,
}

/// Why a single entry did not reach the collector. Only ever logged.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector responded {0}")]
    Rejected(StatusCode),
}
