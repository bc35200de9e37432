//! Response handling
//!
//! Defines response status codes and the JSON response line.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::handlers::{auth_status_code, engine_status_code, protocol_status_code};
use crate::error::{AuthError, EngineError, ProtocolError};

/// Response status codes
pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const INTERNAL_ERROR: u16 = 500;
pub const SERVICE_UNAVAILABLE: u16 = 503;

/// One response line: either `data` or `kind` + `error`, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Success response carrying `payload` as `data`.
    pub fn ok<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(data) => Self {
                status: OK,
                data: Some(data),
                kind: None,
                error: None,
            },
            Err(e) => Self::error(INTERNAL_ERROR, "serialization_error", e.to_string()),
        }
    }

    /// Success response carrying only a message.
    pub fn message(message: &str) -> Self {
        Self::ok(&json!({ "message": message }))
    }

    pub fn error(status: u16, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            data: None,
            kind: Some(kind.to_string()),
            error: Some(message.into()),
        }
    }

    pub fn from_engine_error(err: &EngineError) -> Self {
        Self::error(engine_status_code(err), err.kind(), err.to_string())
    }

    pub fn from_auth_error(err: &AuthError) -> Self {
        // Do not tell the client which half of the credentials was wrong.
        let message = match err {
            AuthError::NotLoggedIn => "Not logged in".to_string(),
            AuthError::MalformedInput(reason) => reason.clone(),
            _ => "Invalid username or password".to_string(),
        };
        Self::error(auth_status_code(err), "auth_error", message)
    }

    pub fn from_protocol_error(err: &ProtocolError) -> Self {
        Self::error(protocol_status_code(err), "bad_request", err.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.status == OK
    }

    /// Serializes the response as a single newline-terminated line.
    pub fn to_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(_) => format!(
                "{{\"status\":{INTERNAL_ERROR},\"kind\":\"serialization_error\",\"error\":\"response could not be encoded\"}}\n"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_line() {
        let line = Response::message("ready").to_line();
        assert_eq!(line, "{\"status\":200,\"data\":{\"message\":\"ready\"}}\n");
    }

    #[test]
    fn test_engine_error_response() {
        let response = Response::from_engine_error(&EngineError::AccessDenied("../etc".into()));
        assert_eq!(response.status, FORBIDDEN);
        assert_eq!(response.kind.as_deref(), Some("access_denied"));
        assert!(response.data.is_none());
        assert!(!response.is_success());
    }

    #[test]
    fn test_auth_errors_do_not_leak_which_part_failed() {
        let unknown = Response::from_auth_error(&AuthError::UserNotFound("eve".into()));
        let wrong = Response::from_auth_error(&AuthError::InvalidPassword("alice".into()));
        assert_eq!(unknown.error, wrong.error);
        assert_eq!(unknown.status, UNAUTHORIZED);
    }
}
