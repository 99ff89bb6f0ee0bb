//! Outbound email client
//!
//! Sends notification emails (low-stock alerts, out-of-stock reports)
//! through an HTTP email API.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::MailerConfig;
use crate::error::{AppError, AppResult};

/// HTTP email API client
#[derive(Clone)]
pub struct MailerClient {
    client: Client,
    api_endpoint: String,
    api_key: String,
    from_address: String,
}

/// Outbound email message
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text_body: String,
}

/// Response from the email API
#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    message_id: Option<String>,
}

impl MailerClient {
    /// Create a new MailerClient from configuration
    pub fn new(config: &MailerConfig) -> Self {
        Self {
            client: Client::new(),
            api_endpoint: config.api_endpoint.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        }
    }

    /// Send a plain-text email
    pub async fn send(&self, to: &str, subject: &str, text_body: &str) -> AppResult<()> {
        let message = EmailMessage {
            from: self.from_address.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            text_body: text_body.to_string(),
        };

        let response = self
            .client
            .post(&self.api_endpoint)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::MailerError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MailerError(format!(
                "email API returned {}: {}",
                status, body
            )));
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| AppError::MailerError(e.to_string()))?;
        tracing::debug!("Email sent, message id: {:?}", parsed.message_id);

        Ok(())
    }

    /// Send a low-stock alert listing the items below their reorder threshold
    pub async fn send_low_stock_alert(
        &self,
        to: &str,
        items: &[(String, String, rust_decimal::Decimal)],
    ) -> AppResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut body = String::from("The following stock items are at or below their reorder threshold:\n\n");
        for (name, unit, quantity) in items {
            body.push_str(&format!("  - {} : {} {}\n", name, quantity, unit));
        }

        self.send(to, "Low stock alert", &body).await
    }
}
