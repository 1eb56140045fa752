//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use cctv_core::domain::DomainError;
use cctv_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const UNAUTHORIZED: i32 = 4004;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
    pub const UPSTREAM_ERROR: i32 = 5002;
}

fn owned(code: i32, msg: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code, msg.into(), None::<()>)
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => owned(code::VALIDATION_ERROR, msg),
        AppError::NotFound(msg) => owned(code::NOT_FOUND, msg),
        AppError::InvalidState(msg) => owned(code::CONFLICT, msg),
        AppError::Domain(e @ DomainError::InvalidStatusTransition { .. }) => {
            owned(code::CONFLICT, e.to_string())
        }
        AppError::Domain(e) => owned(code::VALIDATION_ERROR, e.to_string()),
        AppError::Serialization(e) => owned(code::VALIDATION_ERROR, e.to_string()),
        AppError::Database(msg) => owned(code::DB_ERROR, msg),
        AppError::Upstream(msg) => owned(code::UPSTREAM_ERROR, msg),
        AppError::Config(msg) | AppError::Internal(msg) => owned(code::INTERNAL_ERROR, msg),
    }
}

pub fn throttled() -> ErrorObjectOwned {
    owned(code::THROTTLED, "Rate limit exceeded. Please slow down.")
}

pub fn unauthorized() -> ErrorObjectOwned {
    owned(code::UNAUTHORIZED, "Staff token missing or invalid")
}
