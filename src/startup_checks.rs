use crate::Config;
use crate::email::DispatchConfig;
use crate::tenants::TenantRegistry;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("No tenants configured")]
    NoTenants,

    #[error("Dispatch backend '{provider}' is misconfigured: {reason}")]
    DispatchMisconfigured {
        provider: &'static str,
        reason: String,
    },

    #[error("Delivery timeout must be greater than zero")]
    ZeroDeliveryTimeout,

    #[error("Tenant '{0}' sender address does not look like an email address")]
    SuspiciousSender(String),
}

impl StartupCheckError {
    /// Critical failures stop the server before it binds. An empty registry
    /// is a valid load; it only means every request is rejected.
    pub fn is_critical(&self) -> bool {
        !matches!(
            self,
            StartupCheckError::SuspiciousSender(_) | StartupCheckError::NoTenants
        )
    }
}

pub async fn perform_startup_checks(
    config: &Config,
    registry: &TenantRegistry,
) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    if registry.is_empty() {
        warn!("Tenant registry is empty, every request will be rejected");
        errors.push(StartupCheckError::NoTenants);
    }

    for name in registry.names() {
        let Some(tenant) = registry.get(name) else {
            continue;
        };

        if !tenant.from_address.contains('@') {
            warn!(
                "Tenant '{}' sender address is not an email address: {}",
                name, tenant.from_address
            );
            errors.push(StartupCheckError::SuspiciousSender(name.to_string()));
        }

        if !tenant.requires_secret()
            && let Some(recipient) = tenant.fixed_recipient()
        {
            info!(
                "Tenant '{}' accepts unauthenticated requests, pinned to {}",
                name, recipient
            );
        }
    }

    if config.app.delivery_timeout_secs == 0 {
        error!("Delivery timeout is zero");
        errors.push(StartupCheckError::ZeroDeliveryTimeout);
    }

    match &config.dispatch {
        DispatchConfig::Mailgun(mailgun) => {
            if mailgun.domain.is_empty() {
                errors.push(StartupCheckError::DispatchMisconfigured {
                    provider: "mailgun",
                    reason: "domain is empty".to_string(),
                });
            }
            if mailgun.resolve_api_key().is_none() {
                errors.push(StartupCheckError::DispatchMisconfigured {
                    provider: "mailgun",
                    reason: "api_key is not set and MAILGUN_API_KEY is missing".to_string(),
                });
            }
        }
        DispatchConfig::Sqs(sqs) => {
            if sqs.queue_url.is_empty() {
                errors.push(StartupCheckError::DispatchMisconfigured {
                    provider: "sqs",
                    reason: "queue_url is empty".to_string(),
                });
            }
        }
        DispatchConfig::Amqp(amqp) => {
            if amqp.url.is_empty() {
                errors.push(StartupCheckError::DispatchMisconfigured {
                    provider: "amqp",
                    reason: "url is empty".to_string(),
                });
            }
            if amqp.queue.is_empty() {
                errors.push(StartupCheckError::DispatchMisconfigured {
                    provider: "amqp",
                    reason: "queue is empty".to_string(),
                });
            }
        }
        DispatchConfig::Ses(_) => {
            info!("Using Amazon SES; sender identities must be verified in the SES console");
        }
        DispatchConfig::Null => {
            warn!("Using the null dispatcher: emails are logged, not delivered");
        }
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
