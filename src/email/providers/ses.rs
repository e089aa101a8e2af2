use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};
use tracing::{debug, error};

use crate::email::{DeliveryError, Dispatcher, EmailBody, OutboundMessage, SesConfig};

/// Direct delivery through Amazon SES.
pub struct SesProvider {
    client: Client,
}

impl SesProvider {
    pub async fn new(config: &SesConfig) -> Result<Self, DeliveryError> {
        let aws_config = super::load_aws_config(
            config.region.as_deref(),
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            "mailgate-ses-provider",
        )
        .await;

        Ok(Self::with_client(Client::new(&aws_config)))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn utf8_content(data: &str) -> Result<Content, DeliveryError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| DeliveryError::ProviderError(e.to_string()))
}

#[async_trait]
impl Dispatcher for SesProvider {
    async fn deliver(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        debug!("Sending email via SES to: {}", message.to);

        let destination = Destination::builder().to_addresses(&message.to).build();

        let body = match &message.body {
            EmailBody::Text(text) => Body::builder().text(utf8_content(text)?),
            EmailBody::Html(html) => Body::builder().html(utf8_content(html)?),
        }
        .build();

        let email_message = Message::builder()
            .subject(utf8_content(&message.subject)?)
            .body(body)
            .build();

        let content = EmailContent::builder().simple(email_message).build();

        match self
            .client
            .send_email()
            .from_email_address(&message.from)
            .destination(destination)
            .content(content)
            .send()
            .await
        {
            Ok(output) => {
                debug!(
                    "Email sent successfully. Message ID: {:?}",
                    output.message_id()
                );
                Ok(())
            }
            Err(e) => {
                error!("Failed to send email via SES: {}", e);
                Err(DeliveryError::AwsError(e.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "Amazon SES"
    }
}
