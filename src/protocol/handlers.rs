//! Command handlers
//!
//! Dispatches parsed commands: session commands update the client state,
//! file commands are forwarded to the file engine once the client has
//! logged in. Handlers are synchronous; the server runs them on the
//! blocking pool.

use log::{info, warn};
use serde_json::json;

use crate::auth::{self, CredentialStore};
use crate::client::Client;
use crate::error::AuthError;
use crate::error::handlers::handle_engine_error;
use crate::protocol::commands::{Command, CommandResult, CommandStatus};
use crate::protocol::responses::{BAD_REQUEST, Response};
use crate::storage::FileEngine;

/// Everything a handler needs besides the client itself.
#[derive(Debug)]
pub struct HandlerContext {
    pub engine: FileEngine,
    pub credentials: CredentialStore,
    pub max_username_length: usize,
}

/// Dispatches a received command to its corresponding handler.
pub fn handle_command(client: &mut Client, command: Command, ctx: &HandlerContext) -> CommandResult {
    match command {
        Command::Quit => handle_cmd_quit(client),
        Command::Login { username, password } => {
            handle_cmd_login(client, &username, &password, ctx)
        }
        Command::Logout => handle_cmd_logout(client),
        Command::Whoami => handle_cmd_whoami(client),
        Command::Health => handle_cmd_health(ctx),
        command if !client.is_logged_in() => {
            warn!(
                "Rejected {} from unauthenticated client {:?}",
                command.name(),
                client.client_addr()
            );
            CommandResult::failure(
                "Not logged in",
                Response::from_auth_error(&AuthError::NotLoggedIn),
            )
        }
        command => handle_file_command(&ctx.engine, command),
    }
}

/// Handles QUIT: logs the client out and signals connection close.
fn handle_cmd_quit(client: &mut Client) -> CommandResult {
    client.logout();

    CommandResult {
        status: CommandStatus::CloseConnection,
        response: Response::message("Goodbye"),
    }
}

/// Handles LOGIN: validates the credentials against the injected store.
fn handle_cmd_login(
    client: &mut Client,
    username: &str,
    password: &str,
    ctx: &HandlerContext,
) -> CommandResult {
    match auth::validate_login(
        &ctx.credentials,
        username,
        password,
        ctx.max_username_length,
    ) {
        Ok(()) => {
            client.login(username);
            info!("User {} logged in from {:?}", username, client.client_addr());
            CommandResult::success(Response::message("Login successful"))
        }
        Err(e) => {
            client.logout();
            warn!("Failed login from {:?}: {}", client.client_addr(), e);
            CommandResult::failure(e.to_string(), Response::from_auth_error(&e))
        }
    }
}

/// Handles LOGOUT.
fn handle_cmd_logout(client: &mut Client) -> CommandResult {
    if !client.is_logged_in() {
        return CommandResult::failure(
            "Not logged in",
            Response::from_auth_error(&AuthError::NotLoggedIn),
        );
    }

    client.logout();
    CommandResult::success(Response::message("Logout successful"))
}

/// Handles WHOAMI: answers without requiring a login.
fn handle_cmd_whoami(client: &Client) -> CommandResult {
    CommandResult::success(Response::ok(&json!({
        "logged_in": client.is_logged_in(),
        "username": client.username(),
    })))
}

/// Handles HEALTH: the service is up and its root is reachable.
fn handle_cmd_health(ctx: &HandlerContext) -> CommandResult {
    let root_ok = ctx.engine.root().is_none_or(|root| root.is_dir());
    CommandResult::success(Response::ok(&json!({
        "status": if root_ok { "ok" } else { "degraded" },
        "root": ctx.engine.root().map(|root| root.display().to_string()),
    })))
}

/// Runs a file command against the engine and wraps the outcome.
///
/// A client-supplied read cap may lower the engine's limit but never raise it.
pub fn handle_file_command(engine: &FileEngine, command: Command) -> CommandResult {
    let outcome = match command {
        Command::List { path, show_hidden } => {
            engine.list(&path, show_hidden).map(|r| Response::ok(&r))
        }
        Command::Search {
            path,
            pattern,
            show_hidden,
        } => engine
            .search(&path, &pattern, show_hidden)
            .map(|r| Response::ok(&r)),
        Command::CreateFile { path, content } => {
            engine.create_file(&path, &content).map(|r| Response::ok(&r))
        }
        Command::CreateDirectory { path } => {
            engine.create_directory(&path).map(|r| Response::ok(&r))
        }
        Command::Move {
            source,
            destination,
        } => engine
            .move_item(&source, &destination)
            .map(|r| Response::ok(&r)),
        Command::Delete { path } => engine.delete(&path).map(|r| Response::ok(&r)),
        Command::Read { path, max_size } => {
            let limit = engine.settings().max_read_bytes;
            let max_size = max_size.map_or(limit, |requested| requested.min(limit));
            engine.read(&path, Some(max_size)).map(|r| Response::ok(&r))
        }
        Command::Info { path } => engine.info(&path).map(|r| Response::ok(&r)),
        other @ (Command::Login { .. }
        | Command::Logout
        | Command::Quit
        | Command::Whoami
        | Command::Health) => {
            return CommandResult::failure(
                "Not a file operation",
                Response::error(
                    BAD_REQUEST,
                    "bad_request",
                    format!("{} is not a file operation", other.name()),
                ),
            );
        }
    };

    match outcome {
        Ok(response) => CommandResult::success(response),
        Err(e) => {
            handle_engine_error(&e);
            CommandResult::failure(e.to_string(), Response::from_engine_error(&e))
        }
    }
}
