use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{DeliveryError, Error};
use crate::stats::CapturedEntry;

enum Command {
    Deliver(Arc<CapturedEntry>),
    /// Acknowledged once every command queued before it has been handled.
    Drain(oneshot::Sender<()>),
}

/// Handle to the background task that posts captured entries to the
/// collector, one POST per entry.
///
/// `enqueue` never waits on the network. Failed deliveries are logged and
/// dropped; there is no retry. Entries still queued when the process exits
/// are lost unless `drain` is awaited first.
pub struct Reporter {
    tx: mpsc::UnboundedSender<Command>,
}

struct Worker {
    http: reqwest::Client,
    stats_url: String,
    bearer: String,
}

impl Reporter {
    /// Builds the HTTP client and spawns the delivery task on the current
    /// Tokio runtime.
    pub fn spawn(config: &ClientConfig) -> Result<Self, Error> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(Error::HttpClient)?;

        let worker = Worker {
            http,
            stats_url: config.stats_url.clone(),
            bearer: format!("Bearer {}", config.token),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(worker.run(rx));

        info!(stats_url = %config.stats_url, "stats reporter started");
        Ok(Self { tx })
    }

    /// Queue an entry for delivery. Returns immediately.
    pub fn enqueue(&self, entry: Arc<CapturedEntry>) {
        if self.tx.send(Command::Deliver(entry)).is_err() {
            debug!("stats reporter stopped; dropping entry");
        }
    }

    /// Wait up to `window` for everything queued so far to be attempted,
    /// then stop the worker. Returns `false` if the window ran out first;
    /// whatever was still pending is lost.
    pub async fn drain(&self, window: Duration) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Drain(ack_tx)).is_err() {
            // Already stopped, nothing left to flush
            return true;
        }

        match tokio::time::timeout(window, ack_rx).await {
            // Err here means the worker was torn down before reaching the marker
            Ok(ack) => ack.is_ok(),
            Err(_) => {
                warn!(window_ms = window.as_millis() as u64, "stats drain window elapsed");
                false
            }
        }
    }
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::Deliver(entry) => {
                    if let Err(e) = self.deliver(&entry).await {
                        warn!(
                            error = %e,
                            path = %entry.path,
                            span_id = entry.span_id,
                            "stats delivery failed"
                        );
                    }
                }
                Command::Drain(ack) => {
                    // Stop accepting commands; ones already queued, other
                    // drain markers included, are still handled.
                    rx.close();
                    let _ = ack.send(());
                }
            }
        }
        debug!("stats reporter stopped");
    }

    async fn deliver(&self, entry: &CapturedEntry) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(entry)?;

        let res = self
            .http
            .post(&self.stats_url)
            .header(AUTHORIZATION, &self.bearer)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected(status));
        }

        debug!(path = %entry.path, span_id = entry.span_id, "stats delivered");
        Ok(())
    }
}
