//! Client management
//!
//! Per-connection state and the session loop that serves one client.

pub mod handler;
pub mod state;

pub use handler::handle_client;
pub use state::Client;
