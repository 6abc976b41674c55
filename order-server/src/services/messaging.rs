//! WhatsApp-style messaging gateway client
//!
//! One client serves both sides: customer notifications (text, optional
//! attachment) and supplier offers (button lists whose replies come back
//! through `/api/webhooks/messaging`).

use async_trait::async_trait;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("Messaging request failed: {0}")]
pub struct MessagingError(pub String);

/// A button in an interactive offer message. The id is namespaced
/// (`approve_<panelId>` / `cancel_<panelId>`) and echoed back verbatim by
/// the inbound webhook.
#[derive(Debug, Clone)]
pub struct MessageButton {
    pub id: String,
    pub label: String,
}

#[async_trait]
pub trait Messaging: Send + Sync {
    async fn send_text(&self, phone: &str, message: &str) -> Result<(), MessagingError>;

    async fn send_file(
        &self,
        phone: &str,
        message: &str,
        file_url: &str,
    ) -> Result<(), MessagingError>;

    async fn send_button_list(
        &self,
        phone: &str,
        message: &str,
        buttons: &[MessageButton],
    ) -> Result<(), MessagingError>;
}

/// HTTP implementation (Z-API-style endpoints with a client token header).
pub struct HttpMessaging {
    base_url: String,
    client_token: String,
    client: reqwest::Client,
}

impl HttpMessaging {
    pub fn new(base_url: impl Into<String>, client_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_token: client_token.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<(), MessagingError> {
        let url = format!("{}/{path}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("Client-Token", &self.client_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MessagingError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(MessagingError(format!("{status}: {body}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Messaging for HttpMessaging {
    async fn send_text(&self, phone: &str, message: &str) -> Result<(), MessagingError> {
        self.post("send-text", json!({ "phone": phone, "message": message }))
            .await
    }

    async fn send_file(
        &self,
        phone: &str,
        message: &str,
        file_url: &str,
    ) -> Result<(), MessagingError> {
        self.post(
            "send-file",
            json!({ "phone": phone, "message": message, "fileUrl": file_url }),
        )
        .await
    }

    async fn send_button_list(
        &self,
        phone: &str,
        message: &str,
        buttons: &[MessageButton],
    ) -> Result<(), MessagingError> {
        let buttons: Vec<_> = buttons
            .iter()
            .map(|b| json!({ "id": b.id, "label": b.label }))
            .collect();
        self.post(
            "send-button-list",
            json!({
                "phone": phone,
                "message": message,
                "buttonList": { "buttons": buttons }
            }),
        )
        .await
    }
}
