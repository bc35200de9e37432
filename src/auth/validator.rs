//! Authentication validator
//!
//! Username and password checks against an injected `CredentialStore`.

use super::credentials::CredentialStore;
use crate::error::AuthError;

/// Performs basic input sanitation to check for malicious or malformed usernames/passwords.
fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.contains(['\r', '\n', '\0'])
}

/// Validates that the given username exists in the credential store.
pub fn validate_user(
    store: &CredentialStore,
    username: &str,
    max_length: usize,
) -> Result<(), AuthError> {
    if !is_valid_input(username, max_length) {
        return Err(AuthError::MalformedInput("Invalid username format".into()));
    }

    if username.contains(['/', '\\', '@', '#', ',', '%']) {
        return Err(AuthError::InvalidUsername(username.to_string()));
    }

    if store.contains(username) {
        Ok(())
    } else {
        Err(AuthError::UserNotFound(username.to_string()))
    }
}

/// Validates a username and password pair.
pub fn validate_login(
    store: &CredentialStore,
    username: &str,
    password: &str,
    max_length: usize,
) -> Result<(), AuthError> {
    validate_user(store, username, max_length)?;

    if !is_valid_input(password, max_length) {
        return Err(AuthError::MalformedInput("Invalid password format".into()));
    }

    match store.password_for(username) {
        Some(stored) if stored == password => Ok(()),
        Some(_) => Err(AuthError::InvalidPassword(username.to_string())),
        None => Err(AuthError::UserNotFound(username.to_string())),
    }
}
