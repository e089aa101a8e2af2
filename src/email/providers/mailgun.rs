use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use crate::email::{DeliveryError, Dispatcher, EmailBody, MailgunConfig, OutboundMessage};

/// Direct delivery through the Mailgun messages API.
pub struct MailgunProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl MailgunProvider {
    pub fn new(config: &MailgunConfig) -> Result<Self, DeliveryError> {
        if config.domain.is_empty() {
            return Err(DeliveryError::ConfigError(
                "Mailgun domain is not configured".to_string(),
            ));
        }

        let api_key = config.resolve_api_key().ok_or_else(|| {
            DeliveryError::ConfigError(
                "Mailgun api_key is not configured and MAILGUN_API_KEY is not set".to_string(),
            )
        })?;

        let endpoint = format!(
            "{}/{}/messages",
            config.api_base.trim_end_matches('/'),
            config.domain
        );

        Ok(Self {
            client: Client::new(),
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Dispatcher for MailgunProvider {
    async fn deliver(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        debug!("Sending email via Mailgun to: {}", message.to);

        let body_field = match &message.body {
            EmailBody::Text(text) => ("text", text.as_str()),
            EmailBody::Html(html) => ("html", html.as_str()),
        };
        let form = [
            ("from", message.from.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            body_field,
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("Mailgun accepted message for {}", message.to);
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            error!("Mailgun rejected message: {} {}", status, detail);
            Err(DeliveryError::ProviderError(format!(
                "Mailgun returned {}",
                status
            )))
        }
    }

    fn name(&self) -> &str {
        "Mailgun"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> MailgunConfig {
        MailgunConfig {
            domain: "mg.example.com".to_string(),
            api_key: Some("key-test".to_string()),
            api_base: format!("{}/v3/", server.uri()),
        }
    }

    #[tokio::test]
    async fn test_posts_plain_message_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mg.example.com/messages"))
            .and(header_exists("authorization"))
            .and(body_string_contains("subject=%5BALPHA%5D+hi"))
            .and(body_string_contains("text=body"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let provider = MailgunProvider::new(&config_for(&server)).unwrap();
        let message =
            OutboundMessage::new("relay@x.com", "ops@x.com", "[ALPHA] hi").with_text("body");

        assert!(provider.deliver(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_posts_rich_body_as_html() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mg.example.com/messages"))
            .and(body_string_contains("html=%3Cb%3Ehi%3C%2Fb%3E"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let provider = MailgunProvider::new(&config_for(&server)).unwrap();
        let message = OutboundMessage::new("relay@x.com", "ops@x.com", "hi").with_html("<b>hi</b>");

        assert!(provider.deliver(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_provider_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let provider = MailgunProvider::new(&config_for(&server)).unwrap();
        let message = OutboundMessage::new("relay@x.com", "ops@x.com", "hi").with_text("body");

        assert!(matches!(
            provider.deliver(message).await,
            Err(DeliveryError::ProviderError(_))
        ));
    }

    #[test]
    fn test_missing_domain() {
        let config = MailgunConfig {
            domain: String::new(),
            api_key: Some("key-test".to_string()),
            api_base: "https://api.eu.mailgun.net/v3".to_string(),
        };
        assert!(matches!(
            MailgunProvider::new(&config),
            Err(DeliveryError::ConfigError(_))
        ));
    }
}
