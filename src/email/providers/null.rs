use crate::email::{DeliveryError, Dispatcher, EmailBody, OutboundMessage};
use async_trait::async_trait;
use tracing::info;

/// Logs messages instead of delivering them.
pub struct NullProvider;

impl NullProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatcher for NullProvider {
    async fn deliver(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        let (kind, body) = match &message.body {
            EmailBody::Text(text) => ("text", text),
            EmailBody::Html(html) => ("html", html),
        };
        let body_preview = body.chars().take(200).collect::<String>();

        info!(
            "NULL DISPATCHER - Would send email:\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body ({}, first 200 chars): {}{}",
            message.from,
            message.to,
            message.subject,
            kind,
            body_preview,
            if body.chars().count() > 200 { "..." } else { "" }
        );

        tracing::debug!("NULL DISPATCHER - Full body:\n{}", body);

        Ok(())
    }

    fn name(&self) -> &str {
        "Null Dispatcher (Logging Only)"
    }
}
