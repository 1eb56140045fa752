// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid request status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Unknown request status: {0}")]
    UnknownStatus(String),

    #[error("Unknown delivery method: {0}")]
    UnknownDeliveryMethod(String),

    #[error("Malformed tracking ID: {0}")]
    MalformedTrackingId(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
