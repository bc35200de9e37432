//! Credential storage
//!
//! An explicit, immutable store built from configuration and handed to the
//! server at startup.

use std::collections::HashMap;
use std::fmt;

/// Username to password map
#[derive(Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    /// Builds a store from borrowed pairs, mostly for tests and tooling.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(u, p)| (u.to_string(), p.to_string()))
                .collect(),
        )
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn password_for(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut usernames: Vec<&str> = self.users.keys().map(String::as_str).collect();
        usernames.sort_unstable();
        f.debug_struct("CredentialStore")
            .field("users", &usernames)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_hides_passwords() {
        let store = CredentialStore::from_pairs(&[("alice", "alice123")]);
        let debug = format!("{store:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("alice123"));
    }
}
