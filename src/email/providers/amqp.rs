use async_trait::async_trait;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties,
    options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions},
    types::FieldTable,
};
use tracing::{debug, error, info};

use crate::email::{AmqpConfig, DeliveryError, Dispatcher, OutboundMessage};

/// Delivery mode 2 marks a message persistent.
const PERSISTENT: u8 = 2;

/// Publishes messages to a durable AMQP queue for the mail consumer.
///
/// One channel is opened at startup and shared by every request.
pub struct AmqpProvider {
    // Held so the connection stays open for the lifetime of the channel.
    _connection: Connection,
    channel: Channel,
    queue: String,
}

impl AmqpProvider {
    pub async fn new(config: &AmqpConfig) -> Result<Self, DeliveryError> {
        if config.url.is_empty() {
            return Err(DeliveryError::ConfigError(
                "AMQP url is not configured".to_string(),
            ));
        }
        if config.queue.is_empty() {
            return Err(DeliveryError::ConfigError(
                "AMQP queue is not configured".to_string(),
            ));
        }

        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .map_err(|e| amqp_error("connect", e))?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| amqp_error("create_channel", e))?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| amqp_error("confirm_select", e))?;

        // Same flags as the consumer's declaration, otherwise the broker
        // refuses the redeclare.
        channel
            .queue_declare(
                &config.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| amqp_error("queue_declare", e))?;

        info!(queue = %config.queue, "Declared AMQP queue");

        Ok(Self {
            _connection: connection,
            channel,
            queue: config.queue.clone(),
        })
    }
}

fn amqp_error(operation: &str, e: lapin::Error) -> DeliveryError {
    error!("AMQP {} failed: {}", operation, e);
    DeliveryError::AmqpError(format!("{} failed: {}", operation, e))
}

fn publish_properties() -> BasicProperties {
    BasicProperties::default()
        .with_content_type("application/json".into())
        .with_delivery_mode(PERSISTENT)
}

#[async_trait]
impl Dispatcher for AmqpProvider {
    async fn deliver(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        let body = message.to_json()?;

        let confirm = self
            .channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                body.as_bytes(),
                publish_properties(),
            )
            .await
            .map_err(|e| amqp_error("basic_publish", e))?;
        let confirmation = confirm
            .await
            .map_err(|e| amqp_error("publisher confirm", e))?;
        if confirmation.is_nack() {
            error!(queue = %self.queue, "Broker rejected the message");
            return Err(DeliveryError::AmqpError(format!(
                "broker nacked publish to '{}'",
                self.queue
            )));
        }

        debug!(queue = %self.queue, to = %message.to, "Enqueued email");
        Ok(())
    }

    fn name(&self) -> &str {
        "AMQP"
    }
}
