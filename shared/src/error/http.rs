//! Error code to HTTP status

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Anything not listed is a client mistake (400)
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::ProductNotFound
            | Self::TableNotFound => StatusCode::NOT_FOUND,

            // Order already past the requested point
            Self::OrderAlreadyPaid
            | Self::OrderAlreadyCompleted
            | Self::OrderAlreadyCancelled
            | Self::StatusTransitionNotAllowed => StatusCode::CONFLICT,

            // Forged or unsigned callback
            Self::PaymentSignatureInvalid => StatusCode::UNAUTHORIZED,

            Self::PaymentMockDisabled => StatusCode::FORBIDDEN,

            Self::PaymentGatewayError => StatusCode::BAD_GATEWAY,

            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            _ => StatusCode::BAD_REQUEST,
        }
    }
}
