use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
};
use tracing::{error, info, warn};

use crate::AppState;
use crate::email::deliver_with_timeout;

use super::{RelayError, TENANT_NAME_HEADER, TENANT_SECRET_HEADER, build_message, validate};

/// Header contents as UTF-8. `to_str` would drop anything outside visible
/// ASCII, which would make non-ASCII tenant names unreachable.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|h| std::str::from_utf8(h.as_bytes()).ok())
        .unwrap_or("")
}

pub async fn send_email_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, RelayError> {
    let tenant_name = header_value(&headers, TENANT_NAME_HEADER);
    let presented_secret = header_value(&headers, TENANT_SECRET_HEADER);

    let (tenant, request) = validate(&app_state.registry, tenant_name, presented_secret, &body)
        .inspect_err(|rejection| {
            warn!(tenant = %tenant_name, reason = ?rejection, "Request rejected");
        })?;

    let message = build_message(tenant, request);
    let to = message.to.clone();

    match deliver_with_timeout(
        app_state.dispatcher.as_ref(),
        message,
        app_state.delivery_timeout,
    )
    .await
    {
        Ok(()) => {
            info!(
                tenant = %tenant_name,
                to = %to,
                dispatcher = app_state.dispatcher.name(),
                "Email dispatched"
            );
            Ok(StatusCode::OK)
        }
        Err(e) => {
            error!(
                tenant = %tenant_name,
                dispatcher = app_state.dispatcher.name(),
                "Failed to dispatch email: {}",
                e
            );
            Err(e.into())
        }
    }
}

/// CORS preflight; answered without touching tenant configuration.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn disallowed_method_handler(method: Method) -> StatusCode {
    warn!(method = %method, "Disallowed method on /send-email");
    StatusCode::FORBIDDEN
}
