//! Configuration management for the RAX file service
//!
//! Settings come from `config.toml` layered with `RAX_FS__*` environment
//! overrides, e.g. `RAX_FS__STARTUP__CONTROL_PORT=3000`.

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::storage::{DEFAULT_MAX_READ_BYTES, DEFAULT_MAX_SEARCH_DEPTH, EngineSettings};

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub startup: StartupConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Username to password map backing the credential store.
    #[serde(default)]
    pub users: HashMap<String, String>,
}

/// Network and process settings, read once at startup
#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    /// IP address to bind the control listener
    pub bind_address: String,

    /// Port for the control listener; 0 picks a free port
    pub control_port: u16,

    /// Root directory every file operation is confined to
    pub server_root: String,

    /// Create `server_root` at startup if it does not exist
    #[serde(default)]
    pub create_root: bool,

    /// Maximum concurrent clients
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,

    /// Maximum request line length in bytes
    #[serde(default = "default_max_command_length")]
    pub max_command_length: usize,

    /// Longest accepted username or password
    #[serde(default = "default_max_username_length")]
    pub max_username_length: usize,
}

/// File engine limits
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Default read cap in bytes
    #[serde(default = "default_max_read_bytes")]
    pub max_read_bytes: u64,

    /// Depth cap for recursive search
    #[serde(default = "default_max_search_depth")]
    pub max_search_depth: usize,

    /// Confine operations to `server_root`. Turning this off is only meant
    /// for local tooling.
    #[serde(default = "default_restrict_to_root")]
    pub restrict_to_root: bool,
}

fn default_max_clients() -> usize {
    10
}

fn default_max_command_length() -> usize {
    // Room for a create_file request carrying inline content.
    2 * 1024 * 1024
}

fn default_max_username_length() -> usize {
    64
}

fn default_max_read_bytes() -> u64 {
    DEFAULT_MAX_READ_BYTES
}

fn default_max_search_depth() -> usize {
    DEFAULT_MAX_SEARCH_DEPTH
}

fn default_restrict_to_root() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_read_bytes: default_max_read_bytes(),
            max_search_depth: default_max_search_depth(),
            restrict_to_root: default_restrict_to_root(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Try the deployment layout first, then the working directory
        let config_paths = ["rax-fs/config", "config"];

        let mut last_error = None;

        for config_path in &config_paths {
            let built = Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix("RAX_FS").separator("__"))
                .build();

            match built {
                Ok(settings) => {
                    let config: ServerConfig = settings.try_deserialize()?;
                    config.validate()?;
                    return Ok(config);
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            config::ConfigError::Message(format!(
                "no configuration found, tried {config_paths:?}"
            ))
        }))
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        let config: ServerConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.startup.server_root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "server_root cannot be empty".into(),
            ));
        }

        if self.startup.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.startup.max_command_length == 0 {
            return Err(config::ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        if self.engine.max_read_bytes == 0 {
            return Err(config::ConfigError::Message(
                "max_read_bytes must be greater than 0".into(),
            ));
        }

        if self.engine.max_search_depth == 0 {
            return Err(config::ConfigError::Message(
                "max_search_depth must be greater than 0".into(),
            ));
        }

        for (username, password) in &self.users {
            if username.is_empty() || password.is_empty() {
                return Err(config::ConfigError::Message(
                    "users entries need a non-empty username and password".into(),
                ));
            }
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Get bind address and control port as socket address
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    /// Get server root as PathBuf
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }
}

impl EngineConfig {
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            max_read_bytes: self.max_read_bytes,
            max_search_depth: self.max_search_depth,
        }
    }
}
