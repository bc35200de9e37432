//! Module `commands`
//!
//! Defines the requests a client can send and the result of handling one.

use serde::{Deserialize, Serialize};

use crate::protocol::responses::Response;

/// A request parsed from one line of client input.
///
/// Encoded as a JSON object tagged by `op`, e.g.
/// `{"op":"list","path":"docs","show_hidden":true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Logout,
    Quit,
    /// Reports whether the connection is logged in, and as whom.
    Whoami,
    Health,
    List {
        path: String,
        #[serde(default)]
        show_hidden: bool,
    },
    Search {
        path: String,
        pattern: String,
        #[serde(default)]
        show_hidden: bool,
    },
    CreateFile {
        path: String,
        #[serde(default)]
        content: String,
    },
    #[serde(rename = "mkdir")]
    CreateDirectory { path: String },
    Move {
        source: String,
        destination: String,
    },
    Delete { path: String },
    Read {
        path: String,
        #[serde(default)]
        max_size: Option<u64>,
    },
    Info { path: String },
}

impl Command {
    /// Operation name, safe to log (never includes credentials or content).
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Quit => "quit",
            Command::Whoami => "whoami",
            Command::Health => "health",
            Command::List { .. } => "list",
            Command::Search { .. } => "search",
            Command::CreateFile { .. } => "create_file",
            Command::CreateDirectory { .. } => "mkdir",
            Command::Move { .. } => "move",
            Command::Delete { .. } => "delete",
            Command::Read { .. } => "read",
            Command::Info { .. } => "info",
        }
    }

    /// Whether the command touches the filesystem and so needs a login.
    pub fn is_file_operation(&self) -> bool {
        !matches!(
            self,
            Command::Login { .. }
                | Command::Logout
                | Command::Quit
                | Command::Whoami
                | Command::Health
        )
    }
}

/// Represents the outcome status of executing a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub response: Response,
}

impl CommandResult {
    pub fn success(response: Response) -> Self {
        Self {
            status: CommandStatus::Success,
            response,
        }
    }

    pub fn failure(reason: impl Into<String>, response: Response) -> Self {
        Self {
            status: CommandStatus::Failure(reason.into()),
            response,
        }
    }
}
