use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::email::DeliveryError;

/// Why a request was refused before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Does not match any configuration")]
    UnknownTenant,

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad json or too much fields")]
    MalformedPayload,

    #[error("Missing some fields")]
    MissingFields,

    #[error("You can not use a 'recipient' field, edit the configuration")]
    RecipientConflict,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::Forbidden => StatusCode::FORBIDDEN,
            Rejection::UnknownTenant
            | Rejection::MalformedPayload
            | Rejection::MissingFields
            | Rejection::RecipientConflict => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::Forbidden => self.status().into_response(),
            _ => (self.status(), self.to_string()).into_response(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Could not send email: {0}")]
    Delivery(#[from] DeliveryError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::Rejected(rejection) => rejection.into_response(),
            RelayError::Delivery(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not send email").into_response()
            }
        }
    }
}
