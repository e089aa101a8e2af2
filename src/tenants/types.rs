use serde::{Deserialize, Serialize};

/// Policy for one named caller of the relay.
///
/// Field names follow the JSON tenant file (`Secret`, `From`, `To`, `Prefix`,
/// `Secure`). Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TenantConfig {
    #[serde(rename = "Secret", default)]
    pub secret: String,
    #[serde(rename = "From", default)]
    pub from_address: String,
    #[serde(rename = "To", default)]
    pub fixed_recipient: String,
    #[serde(rename = "Prefix", default)]
    pub subject_prefix: String,
    #[serde(rename = "Secure", default)]
    pub secure_body: bool,
}

impl TenantConfig {
    pub fn requires_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    pub fn fixed_recipient(&self) -> Option<&str> {
        if self.fixed_recipient.is_empty() {
            None
        } else {
            Some(&self.fixed_recipient)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_deserialization_defaults() {
        let tenant: TenantConfig = serde_json::from_str(r#"{"From": "noreply@x.com"}"#).unwrap();
        assert_eq!(tenant.from_address, "noreply@x.com");
        assert!(!tenant.requires_secret());
        assert_eq!(tenant.fixed_recipient(), None);
        assert_eq!(tenant.subject_prefix, "");
        assert!(!tenant.secure_body);
    }

    #[test]
    fn test_tenant_rejects_unknown_fields() {
        let result = serde_json::from_str::<TenantConfig>(
            r#"{"From": "noreply@x.com", "Cc": "boss@x.com"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        let result = serde_json::from_str::<TenantConfig>(r#"{"from": "noreply@x.com"}"#);
        assert!(result.is_err());
    }
}
