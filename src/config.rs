//! Configuration management for Keepsake
//!
//! Loads settings from TOML file at ~/.keepsake/config.toml

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Data directory (defaults to ~/.keepsake)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".keepsake"))
        .unwrap_or_else(|| PathBuf::from(".keepsake"))
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port (default: 3333)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Server host (default: 127.0.0.1 - localhost only)
    /// WARNING: Setting to "0.0.0.0" exposes the server to your network.
    /// Only do this on trusted networks and configure auth tokens.
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3333
}

fn default_host() -> String {
    "127.0.0.1".to_string() // Localhost only - secure by default
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Authentication configuration — maps bearer tokens to principals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token -> owning user id.
    /// When non-empty, every request must carry a known token:
    /// "Authorization: Bearer <token>"
    #[serde(default)]
    pub tokens: BTreeMap<String, Uuid>,

    /// Principal assumed for every request when no tokens are configured
    /// (local single-user mode).
    #[serde(default = "default_local_user")]
    pub local_user: Uuid,
}

fn default_local_user() -> Uuid {
    // Stable default so a fresh install works without provisioning users
    Uuid::from_u128(0xe00124fd_8336_4902_858c_0050dfda92b5)
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            tokens: BTreeMap::new(),
            local_user: default_local_user(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = expand_path(path.as_ref());

        if !expanded_path.exists() {
            return Err(CoreError::Config(format!(
                "Configuration file not found: {}",
                expanded_path.display()
            )));
        }

        let content = std::fs::read_to_string(&expanded_path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }

    /// Load configuration from file or use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|p| p.join(".keepsake").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".keepsake/config.toml"))
    }

    /// Get the data directory, expanding ~ if present
    pub fn data_dir(&self) -> PathBuf {
        expand_path(&self.data_dir)
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> SocketAddr {
        use std::net::ToSocketAddrs;

        format!("{}:{}", self.server.host, self.server.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], self.server.port)))
    }

    /// Apply environment variable overrides (server options only)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("KEEPSAKE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("KEEPSAKE_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(data_dir) = std::env::var("KEEPSAKE_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Create a default configuration file at the given path
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        // Write a well-commented config file
        let content = r#"# Keepsake Configuration

[server]
# Port to listen on (default: 3333)
port = 3333

# Host to bind to
# "127.0.0.1" = localhost only (secure, recommended)
# "0.0.0.0" = all interfaces (exposes to network - configure auth tokens!)
host = "127.0.0.1"

[auth]
# Principal assumed for every request when no tokens are configured.
# local_user = "e00124fd-8336-4902-858c-0050dfda92b5"

# Bearer tokens mapped to user ids. When any token is configured,
# every request must send: Authorization: Bearer <token>
# [auth.tokens]
# "your-secret-token" = "e00124fd-8336-4902-858c-0050dfda92b5"
"#;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap());
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3333);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.auth.tokens.is_empty());
        assert_eq!(
            config.auth.local_user.to_string(),
            "e00124fd-8336-4902-858c-0050dfda92b5"
        );
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
port = 9000
host = "0.0.0.0"

[auth]
local_user = "11111111-2222-4333-8444-555555555555"

[auth.tokens]
"alpha-token" = "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.tokens.len(), 1);
        assert_eq!(
            config.auth.tokens["alpha-token"].to_string(),
            "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee"
        );
        assert_eq!(
            config.auth.local_user.to_string(),
            "11111111-2222-4333-8444-555555555555"
        );
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr().port(), 3333);
        assert!(config.server_addr().ip().is_loopback());
    }
}
