use sha2::{Digest, Sha256};
use tracing::debug;

use crate::tenants::{TenantConfig, TenantRegistry};

use super::{IncomingRequest, NormalizedRequest, Rejection};

/// Runs the full accept/reject decision for one request.
///
/// Checks happen in a fixed order (tenant, secret, payload shape, required
/// fields, recipient policy) and stop at the first failure, so the same input
/// always yields the same rejection.
pub fn validate<'a>(
    registry: &'a TenantRegistry,
    tenant_name: &str,
    presented_secret: &str,
    payload: &[u8],
) -> Result<(&'a TenantConfig, NormalizedRequest), Rejection> {
    let tenant = registry.get(tenant_name).ok_or(Rejection::UnknownTenant)?;

    if tenant.requires_secret() && !secret_matches(&tenant.secret, presented_secret) {
        return Err(Rejection::Forbidden);
    }

    let request = decode_payload(payload)?;
    let normalized = apply_policy(tenant, request)?;

    Ok((tenant, normalized))
}

pub fn decode_payload(payload: &[u8]) -> Result<IncomingRequest, Rejection> {
    serde_json::from_slice(payload).map_err(|e| {
        debug!("Rejecting payload: {}", e);
        Rejection::MalformedPayload
    })
}

/// Resolves the recipient and enforces required fields for a decoded request.
pub fn apply_policy(
    tenant: &TenantConfig,
    request: IncomingRequest,
) -> Result<NormalizedRequest, Rejection> {
    let fixed_recipient = tenant.fixed_recipient();
    let requested_recipient = request.recipient();

    if (requested_recipient.is_none() && fixed_recipient.is_none())
        || request.subject.is_empty()
        || request.content.is_empty()
    {
        debug!(
            has_recipient = requested_recipient.is_some() || fixed_recipient.is_some(),
            has_subject = !request.subject.is_empty(),
            has_content = !request.content.is_empty(),
            "Rejecting request with missing fields"
        );
        return Err(Rejection::MissingFields);
    }

    let effective_recipient = match (fixed_recipient, requested_recipient) {
        (Some(_), Some(_)) => return Err(Rejection::RecipientConflict),
        (Some(fixed), None) => fixed.to_string(),
        (None, Some(requested)) => requested.to_string(),
        (None, None) => return Err(Rejection::MissingFields),
    };

    Ok(NormalizedRequest {
        effective_recipient,
        subject: request.subject,
        content: request.content,
    })
}

/// Compares digests so the timing does not reveal how much of the raw
/// secret matched.
pub fn secret_matches(expected: &str, presented: &str) -> bool {
    Sha256::digest(expected.as_bytes()) == Sha256::digest(presented.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TenantRegistry {
        TenantRegistry::from_json(
            r#"{
                "alpha": {"From": "relay@x.com", "To": "ops@x.com", "Prefix": "[ALPHA] "},
                "beta": {"Secret": "s3cret", "From": "relay@x.com"},
                "gamma": {"Secret": "s3cret", "From": "relay@x.com", "To": "desk@x.com"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_fixed_recipient_is_used() {
        let registry = registry();
        let (tenant, normalized) =
            validate(&registry, "alpha", "", br#"{"subject":"hi","content":"body"}"#).unwrap();
        assert_eq!(tenant.subject_prefix, "[ALPHA] ");
        assert_eq!(
            normalized,
            NormalizedRequest {
                effective_recipient: "ops@x.com".to_string(),
                subject: "hi".to_string(),
                content: "body".to_string(),
            }
        );
    }

    #[test]
    fn test_payload_recipient_is_used_without_fixed_recipient() {
        let registry = registry();
        let (_, normalized) = validate(
            &registry,
            "beta",
            "s3cret",
            br#"{"recipient":"someone@y.com","subject":"hi","content":"body"}"#,
        )
        .unwrap();
        assert_eq!(normalized.effective_recipient, "someone@y.com");
    }

    #[test]
    fn test_unknown_tenant() {
        let registry = registry();
        assert_eq!(
            validate(&registry, "delta", "", b"{}").unwrap_err(),
            Rejection::UnknownTenant
        );
        assert_eq!(
            validate(&registry, "", "", b"{}").unwrap_err(),
            Rejection::UnknownTenant
        );
    }

    #[test]
    fn test_wrong_or_missing_secret() {
        let registry = registry();
        let payload = br#"{"recipient":"a@y.com","subject":"hi","content":"body"}"#;
        assert_eq!(
            validate(&registry, "beta", "wrong", payload).unwrap_err(),
            Rejection::Forbidden
        );
        assert_eq!(
            validate(&registry, "beta", "", payload).unwrap_err(),
            Rejection::Forbidden
        );
        assert_eq!(
            validate(&registry, "beta", "S3CRET", payload).unwrap_err(),
            Rejection::Forbidden
        );
    }

    #[test]
    fn test_secret_is_ignored_for_open_tenant() {
        let registry = registry();
        let payload = br#"{"subject":"hi","content":"body"}"#;
        assert!(validate(&registry, "alpha", "anything", payload).is_ok());
    }

    #[test]
    fn test_secret_checked_before_payload() {
        let registry = registry();
        assert_eq!(
            validate(&registry, "beta", "wrong", b"not json").unwrap_err(),
            Rejection::Forbidden
        );
    }

    #[test]
    fn test_unknown_field_is_malformed() {
        let registry = registry();
        assert_eq!(
            validate(
                &registry,
                "alpha",
                "",
                br#"{"subject":"hi","content":"body","cc":"x@y.com"}"#
            )
            .unwrap_err(),
            Rejection::MalformedPayload
        );
    }

    #[test]
    fn test_bad_json_is_malformed() {
        let registry = registry();
        let payloads: [&[u8]; 4] = [b"", b"{", b"[]", br#"{"subject": 5}"#];
        for payload in payloads {
            assert_eq!(
                validate(&registry, "alpha", "", payload).unwrap_err(),
                Rejection::MalformedPayload
            );
        }
    }

    #[test]
    fn test_missing_fields() {
        let registry = registry();
        let cases: [(&str, &str, &[u8]); 4] = [
            ("alpha", "", br#"{"content":"body"}"#),
            ("alpha", "", br#"{"subject":"hi","content":""}"#),
            ("beta", "s3cret", br#"{"subject":"hi","content":"body"}"#),
            ("beta", "s3cret", br#"{"recipient":"","subject":"hi","content":"body"}"#),
        ];
        for (tenant, secret, payload) in cases {
            assert_eq!(
                validate(&registry, tenant, secret, payload).unwrap_err(),
                Rejection::MissingFields
            );
        }
    }

    #[test]
    fn test_null_fields_count_as_missing() {
        let registry = registry();
        let cases: [(&str, &str, &[u8]); 3] = [
            ("alpha", "", br#"{"subject":null,"content":"body"}"#),
            ("alpha", "", br#"{"subject":"hi","content":null}"#),
            ("beta", "s3cret", br#"{"recipient":null,"subject":"hi","content":"body"}"#),
        ];
        for (tenant, secret, payload) in cases {
            assert_eq!(
                validate(&registry, tenant, secret, payload).unwrap_err(),
                Rejection::MissingFields
            );
        }
    }

    #[test]
    fn test_missing_fields_checked_before_conflict() {
        let registry = registry();
        assert_eq!(
            validate(
                &registry,
                "alpha",
                "",
                br#"{"recipient":"other@x.com","subject":"","content":"body"}"#
            )
            .unwrap_err(),
            Rejection::MissingFields
        );
    }

    #[test]
    fn test_recipient_conflict() {
        let registry = registry();
        let payload = br#"{"recipient":"other@x.com","subject":"hi","content":"body"}"#;
        assert_eq!(
            validate(&registry, "alpha", "", payload).unwrap_err(),
            Rejection::RecipientConflict
        );
        assert_eq!(
            validate(&registry, "gamma", "s3cret", payload).unwrap_err(),
            Rejection::RecipientConflict
        );
    }

    #[test]
    fn test_empty_recipient_does_not_conflict() {
        let registry = registry();
        let (_, normalized) = validate(
            &registry,
            "alpha",
            "",
            br#"{"recipient":"","subject":"hi","content":"body"}"#,
        )
        .unwrap();
        assert_eq!(normalized.effective_recipient, "ops@x.com");
    }

    #[test]
    fn test_rejection_is_repeatable() {
        let registry = registry();
        let payload = br#"{"recipient":"other@x.com","subject":"hi","content":"body"}"#;
        let first = validate(&registry, "alpha", "", payload).unwrap_err();
        for _ in 0..5 {
            assert_eq!(validate(&registry, "alpha", "", payload).unwrap_err(), first);
        }
    }

    #[test]
    fn test_secret_matches() {
        assert!(secret_matches("abc", "abc"));
        assert!(!secret_matches("abc", "abd"));
        assert!(!secret_matches("abc", "abcd"));
        assert!(!secret_matches("abc", ""));
    }
}
