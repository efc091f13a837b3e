//! Keepsake - headless service for storing and serving personal memories
//!
//! This crate provides the core functionality for Keepsake:
//! - SQLite storage for memories
//! - HTTP CRUD API for remote access
//! - Bearer-token authentication mapping callers to owning users
//!
//! # Usage
//!
//! As a library (embedded in a host application):
//! ```ignore
//! use keepsake::{Config, Core};
//!
//! let config = Config::from_file("~/.keepsake/config.toml").unwrap();
//! let core = Core::new(config).unwrap();
//! // core.start_api_server().await.unwrap();
//! ```
//!
//! As a standalone server (CLI):
//! ```text
//! keepsake --config ~/.keepsake/config.toml
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;

// Re-export main types for convenience
pub use config::Config;
pub use db::Database;
pub use error::{CoreError, Result};

use std::sync::Arc;

/// Core service that wires configuration and storage together
pub struct Core {
    /// Configuration
    pub config: Config,

    /// Database connection
    pub db: Arc<Database>,
}

impl Core {
    /// Create a new Core instance with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.data_dir().join("keepsake.db");
        let db = Database::new(db_path)?;

        Ok(Core {
            config,
            db: Arc::new(db),
        })
    }

    /// Create a Core instance with an existing database (for embedding)
    pub fn with_database(config: Config, db: Arc<Database>) -> Self {
        Core { config, db }
    }

    /// Start the HTTP API server
    pub async fn start_api_server(&self) -> Result<()> {
        let addr = self.config.server_addr();
        tracing::info!("Starting API server on {}", addr);
        api::serve(addr, self.db.clone(), &self.config).await
    }

    /// Get a reference to the database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}
