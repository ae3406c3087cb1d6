use crate::core::telemetry::records::TelemetryRecord;
use anyhow::{anyhow, Context, Error};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const FLUSH_INTERVAL: Duration = Duration::from_millis(500);
const MAX_BATCH: usize = 500;

/// Append-only analytics sink. Records are queued on an unbounded
/// channel and shipped as NDJSON batches by a background writer, so
/// an append never suspends the request path and never fails it
pub struct TelemetrySink {
    tx: Option<mpsc::UnboundedSender<TelemetryRecord>>,
}

impl TelemetrySink {
    /// Probes the sink endpoint and spawns the writer. A refused
    /// connection surfaces as an error so the caller can degrade to
    /// the no-op sink
    pub async fn connect(url: &str) -> Result<TelemetrySink, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent("sellside")
            .timeout(Duration::from_secs(5))
            .build()?;

        let probe = client
            .head(url)
            .send()
            .await
            .with_context(|| format!("telemetry sink {url} unreachable"))?;

        if probe.status().is_server_error() {
            return Err(anyhow!("telemetry sink returned http {}", probe.status()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_loop(client, url.to_string(), rx));

        Ok(TelemetrySink { tx: Some(tx) })
    }

    /// The no-op sink used when analytics is disabled or unreachable
    pub fn disabled() -> TelemetrySink {
        TelemetrySink { tx: None }
    }

    pub fn enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue a record. Failures are logged and swallowed, telemetry
    /// must never take a request down with it
    pub fn append(&self, record: TelemetryRecord) {
        let Some(tx) = &self.tx else {
            return;
        };

        if tx.send(record).is_err() {
            warn!("telemetry writer gone, dropping record");
        }
    }
}

async fn write_loop(
    client: reqwest::Client,
    url: String,
    mut rx: mpsc::UnboundedReceiver<TelemetryRecord>,
) {
    let mut batch: Vec<TelemetryRecord> = Vec::new();
    let mut ticker = tokio::time::interval(FLUSH_INTERVAL);

    loop {
        tokio::select! {
            received = rx.recv() => {
                match received {
                    Some(record) => {
                        batch.push(record);
                        if batch.len() >= MAX_BATCH {
                            flush(&client, &url, &mut batch).await;
                        }
                    }
                    None => {
                        // producer side dropped on shutdown, final flush
                        flush(&client, &url, &mut batch).await;
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                flush(&client, &url, &mut batch).await;
            }
        }
    }
}

async fn flush(client: &reqwest::Client, url: &str, batch: &mut Vec<TelemetryRecord>) {
    if batch.is_empty() {
        return;
    }

    let mut body = String::new();
    for record in batch.iter() {
        match serde_json::to_string(record) {
            Ok(line) => {
                body.push_str(&line);
                body.push('\n');
            }
            Err(e) => warn!(error = %e, "unserializable telemetry record dropped"),
        }
    }

    let count = batch.len();
    batch.clear();

    match client
        .post(url)
        .header("content-type", "application/x-ndjson")
        .body(body)
        .send()
        .await
    {
        Ok(res) if res.status().is_success() => {
            debug!(records = count, "telemetry batch shipped")
        }
        Ok(res) => warn!(status = %res.status(), records = count, "telemetry batch rejected"),
        Err(e) => warn!(error = %e, records = count, "telemetry batch failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::telemetry::records::{stamp, ClickRecord};

    #[test]
    fn disabled_sink_swallows_appends() {
        let sink = TelemetrySink::disabled();
        assert!(!sink.enabled());

        let (ts, date) = stamp();
        sink.append(TelemetryRecord::Click(ClickRecord {
            ts,
            date,
            event_id: "ev-1".into(),
        }));
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        // nothing listens on this port
        let result = TelemetrySink::connect("http://127.0.0.1:1/ingest").await;
        assert!(result.is_err());
    }
}
