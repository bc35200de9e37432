//! Request parsing

use crate::error::ProtocolError;
use crate::protocol::commands::Command;

/// Parses one request line into a `Command`.
///
/// Requests are JSON objects; the bare words `QUIT`/`Q` and `LOGOUT` are
/// accepted as well for interactive sessions.
pub fn parse_command(raw: &str, max_length: usize) -> Result<Command, ProtocolError> {
    let trimmed = raw.trim();

    if trimmed.len() > max_length {
        return Err(ProtocolError::RequestTooLong {
            length: trimmed.len(),
            max: max_length,
        });
    }

    if trimmed.is_empty() {
        return Err(ProtocolError::EmptyRequest);
    }

    match trimmed.to_ascii_uppercase().as_str() {
        "QUIT" | "Q" => return Ok(Command::Quit),
        "LOGOUT" => return Ok(Command::Logout),
        _ => {}
    }

    Ok(serde_json::from_str(trimmed)?)
}
