use async_trait::async_trait;
use aws_sdk_sqs::Client;
use tracing::{debug, error};

use crate::email::{DeliveryError, Dispatcher, OutboundMessage, SqsConfig};

/// Publishes messages to an SQS queue for a separate consumer to deliver.
pub struct SqsProvider {
    client: Client,
    queue_url: String,
}

impl SqsProvider {
    pub async fn new(config: &SqsConfig) -> Result<Self, DeliveryError> {
        if config.queue_url.is_empty() {
            return Err(DeliveryError::ConfigError(
                "SQS queue_url is not configured".to_string(),
            ));
        }

        let aws_config = super::load_aws_config(
            config.region.as_deref(),
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            "mailgate-sqs-provider",
        )
        .await;

        Ok(Self::with_client(
            Client::new(&aws_config),
            config.queue_url.clone(),
        ))
    }

    pub fn with_client(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl Dispatcher for SqsProvider {
    async fn deliver(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        let body = message.to_json()?;

        let response = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| {
                error!("SQS send_message failed: {}", e);
                DeliveryError::AwsError(format!("SQS send_message failed: {}", e))
            })?;

        debug!(
            queue_url = %self.queue_url,
            message_id = response.message_id().unwrap_or("unknown"),
            to = %message.to,
            "Enqueued email"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "Amazon SQS"
    }
}
