//! Wire protocol implementation
//!
//! Newline-delimited JSON requests and responses: parsing, dispatch to the
//! file engine, and response generation.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus};
pub use handlers::{HandlerContext, handle_command, handle_file_command};
pub use parser::parse_command;
pub use responses::Response;
