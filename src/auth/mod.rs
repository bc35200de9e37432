//! Authentication system
//!
//! Handles credential storage and validation for connecting clients.

pub mod credentials;
pub mod validator;

pub use credentials::CredentialStore;
pub use validator::{validate_login, validate_user};
