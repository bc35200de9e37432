//! Module `client`
//!
//! Defines the `Client` struct holding per-connection state: who the client
//! is and whether it has logged in.

use std::net::SocketAddr;

/// Represents the state of a connected client.
#[derive(Debug, Clone, Default)]
pub struct Client {
    username: Option<String>,
    client_addr: Option<SocketAddr>,
    is_logged_in: bool,
}

impl Client {
    pub fn new(client_addr: SocketAddr) -> Self {
        Self {
            client_addr: Some(client_addr),
            ..Self::default()
        }
    }

    /// Marks the client as authenticated as `username`.
    pub fn login(&mut self, username: &str) {
        self.username = Some(username.to_string());
        self.is_logged_in = true;
    }

    /// Clears authentication; the connection address is kept.
    pub fn logout(&mut self) {
        self.username = None;
        self.is_logged_in = false;
    }

    /// Returns whether the client has successfully logged in.
    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    /// Returns the username of the client if logged in.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the client's socket address if known.
    pub fn client_addr(&self) -> Option<&SocketAddr> {
        self.client_addr.as_ref()
    }
}
