use crate::email::OutboundMessage;
use crate::tenants::TenantConfig;

use super::NormalizedRequest;

/// Applies tenant policy to a validated request.
///
/// The subject prefix is prepended verbatim; `secure_body` alone decides
/// whether the content is sent as HTML or plain text.
pub fn build_message(tenant: &TenantConfig, request: NormalizedRequest) -> OutboundMessage {
    let subject = format!("{}{}", tenant.subject_prefix, request.subject);
    let message = OutboundMessage::new(
        tenant.from_address.clone(),
        request.effective_recipient,
        subject,
    );

    if tenant.secure_body {
        message.with_html(request.content)
    } else {
        message.with_text(request.content)
    }
}
