pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Hands a built message to a delivery backend.
///
/// Implementations are shared across concurrent requests and must not
/// retry on their own.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn deliver(&self, message: OutboundMessage) -> Result<(), DeliveryError>;
    fn name(&self) -> &str;
}

pub type DynDispatcher = Arc<dyn Dispatcher>;

pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn create_dispatcher(config: &DispatchConfig) -> Result<DynDispatcher, DeliveryError> {
    match config {
        DispatchConfig::Mailgun(mailgun_config) => Ok(Arc::new(
            providers::mailgun::MailgunProvider::new(mailgun_config)?,
        )),
        DispatchConfig::Ses(ses_config) => Ok(Arc::new(
            providers::ses::SesProvider::new(ses_config).await?,
        )),
        DispatchConfig::Sqs(sqs_config) => Ok(Arc::new(
            providers::sqs::SqsProvider::new(sqs_config).await?,
        )),
        DispatchConfig::Amqp(amqp_config) => Ok(Arc::new(
            providers::amqp::AmqpProvider::new(amqp_config).await?,
        )),
        DispatchConfig::Null => Ok(Arc::new(providers::null::NullProvider::new())),
    }
}

pub async fn deliver_with_timeout(
    dispatcher: &dyn Dispatcher,
    message: OutboundMessage,
    timeout: Duration,
) -> Result<(), DeliveryError> {
    match tokio::time::timeout(timeout, dispatcher.deliver(message)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout(timeout)),
    }
}
