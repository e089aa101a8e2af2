use serde::{Deserialize, Deserializer};

pub const TENANT_NAME_HEADER: &str = "email-server-name";
pub const TENANT_SECRET_HEADER: &str = "email-server-secret";

/// JSON body of `POST /send-email`. Any other field is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncomingRequest {
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

/// `null` reads the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl IncomingRequest {
    /// The caller-supplied recipient, treating an empty string as absent.
    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref().filter(|r| !r.is_empty())
    }
}

/// A request that passed validation, with the recipient already resolved
/// against tenant policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub effective_recipient: String,
    pub subject: String,
    pub content: String,
}
