//! RAX file service
//!
//! A root-scoped filesystem engine and the line-oriented JSON server that
//! exposes it to authenticated clients.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;

pub use error::{EngineError, EngineResult};
pub use server::Server;
pub use storage::FileEngine;
