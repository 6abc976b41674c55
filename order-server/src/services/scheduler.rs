//! External scheduler client
//!
//! Registers future HTTP callbacks against our own webhook endpoints
//! (`/api/webhooks/orders/...`). Timers are never held in-process, so a
//! restart loses nothing; a lost registration is covered by the periodic
//! panel sweep.

use async_trait::async_trait;
use serde_json::json;
use shared::util::from_millis;

#[derive(Debug, thiserror::Error)]
#[error("Scheduler request failed: {0}")]
pub struct SchedulerError(pub String);

#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Ask the external scheduler to POST `data` to our webhook `path`
    /// at `trigger_at` (epoch millis).
    async fn schedule(
        &self,
        trigger_at: i64,
        path: &str,
        data: serde_json::Value,
    ) -> Result<(), SchedulerError>;
}

/// HTTP implementation (`POST /webhook/schedule {triggerAt, url, data}`).
pub struct HttpScheduler {
    base_url: String,
    /// Public base URL of this server, prepended to callback paths.
    callback_base_url: String,
    client: reqwest::Client,
}

impl HttpScheduler {
    pub fn new(base_url: impl Into<String>, callback_base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            callback_base_url: callback_base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Scheduler for HttpScheduler {
    async fn schedule(
        &self,
        trigger_at: i64,
        path: &str,
        data: serde_json::Value,
    ) -> Result<(), SchedulerError> {
        let url = format!("{}/webhook/schedule", self.base_url);
        let body = json!({
            "triggerAt": from_millis(trigger_at).to_rfc3339(),
            "url": format!("{}{path}", self.callback_base_url),
            "data": data,
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SchedulerError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SchedulerError(format!("{status}: {body}")));
        }
        Ok(())
    }
}
