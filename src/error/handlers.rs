//! Error handlers
//!
//! Maps errors onto response status codes and logs them.

use log::{error, warn};

use crate::error::types::{AuthError, EngineError, ProtocolError};
use crate::protocol::responses::{
    BAD_REQUEST, FORBIDDEN, INTERNAL_ERROR, NOT_FOUND, UNAUTHORIZED,
};

/// Convert an engine error to a response status code.
///
/// Boundary violations and permission failures map to 403, missing paths to
/// 404, request-level validation failures to 400, anything else to 500.
pub fn engine_status_code(err: &EngineError) -> u16 {
    match err {
        EngineError::AccessDenied(_) | EngineError::PermissionDenied(_) => FORBIDDEN,
        EngineError::NotFound(_) => NOT_FOUND,
        EngineError::AlreadyExists(_)
        | EngineError::NotADirectory(_)
        | EngineError::NotAFile(_)
        | EngineError::TooLarge { .. }
        | EngineError::InvalidPattern { .. }
        | EngineError::InvalidInput(_) => BAD_REQUEST,
        EngineError::Io { .. } => INTERNAL_ERROR,
    }
}

/// Convert an authentication error to a response status code.
pub fn auth_status_code(err: &AuthError) -> u16 {
    match err {
        AuthError::MalformedInput(_) => BAD_REQUEST,
        _ => UNAUTHORIZED,
    }
}

/// Convert a protocol error to a response status code.
pub fn protocol_status_code(_err: &ProtocolError) -> u16 {
    BAD_REQUEST
}

/// Log an engine error at a level matching its severity.
pub fn handle_engine_error(err: &EngineError) {
    match err {
        EngineError::Io { .. } => error!("File engine error: {}", err),
        EngineError::AccessDenied(_) => warn!("Blocked request: {}", err),
        _ => warn!("File operation failed: {}", err),
    }
}
