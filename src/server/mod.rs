//! Server core functionality
//!
//! Builds the file engine and credential store from configuration and runs
//! the accept loop.

pub mod core;

pub use core::Server;
