use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Dispatch configuration error: {0}")]
    ConfigError(String),

    #[error("Email provider error: {0}")]
    ProviderError(String),

    #[error("AWS SDK error: {0}")]
    AwsError(String),

    #[error("AMQP error: {0}")]
    AmqpError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),
}
