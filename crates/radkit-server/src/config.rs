use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// User entry for the built-in static authentication handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen address shared by both sockets
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Authentication (Access-Request) port
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,

    /// Accounting (Accounting-Request) port
    #[serde(default = "default_acct_port")]
    pub acct_port: u16,

    /// Shared secret expected from every NAS
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Users for the built-in static authentication handler
    #[serde(default)]
    pub users: Vec<User>,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "info")
    #[serde(default)]
    pub log_level: Option<String>,

    /// Audit log file path (JSON lines, optional)
    #[serde(default)]
    pub audit_log_path: Option<String>,
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_auth_port() -> u16 {
    1645 // Legacy RADIUS authentication port
}

fn default_acct_port() -> u16 {
    1646 // Legacy RADIUS accounting port
}

fn default_secret() -> String {
    "testing123".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: default_listen_address(),
            auth_port: default_auth_port(),
            acct_port: default_acct_port(),
            secret: default_secret(),
            users: vec![],
            log_level: None,
            audit_log_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Socket address for the authentication listener
    pub fn auth_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.listen_ip()?, self.auth_port))
    }

    /// Socket address for the accounting listener
    pub fn acct_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.listen_ip()?, self.acct_port))
    }

    fn listen_ip(&self) -> Result<IpAddr, ConfigError> {
        self.listen_address.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid listen address: {}", self.listen_address))
        })
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), ConfigError> {
        self.listen_ip()?;

        if self.auth_port == 0 || self.acct_port == 0 {
            return Err(ConfigError::Invalid("Port cannot be 0".to_string()));
        }
        if self.auth_port == self.acct_port {
            return Err(ConfigError::Invalid(format!(
                "Authentication and accounting ports must differ (both {})",
                self.auth_port
            )));
        }

        if self.secret.is_empty() {
            return Err(ConfigError::Invalid("Secret cannot be empty".to_string()));
        }

        for user in &self.users {
            if user.username.is_empty() {
                return Err(ConfigError::Invalid("User has empty username".to_string()));
            }
        }

        Ok(())
    }

    /// Create an example configuration file
    pub fn example() -> Self {
        Config {
            listen_address: "0.0.0.0".to_string(),
            auth_port: 1645,
            acct_port: 1646,
            secret: "testing123".to_string(),
            users: vec![
                User {
                    username: "admin".to_string(),
                    password: "admin123".to_string(),
                },
                User {
                    username: "user1".to_string(),
                    password: "password1".to_string(),
                },
            ],
            log_level: Some("info".to_string()),
            audit_log_path: Some("/var/log/radkit/audit.log".to_string()),
        }
    }
}
