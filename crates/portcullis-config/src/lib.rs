//! Configuration management for Portcullis
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (`PORTCULLIS_*` prefix, `__` between section and key)
//! 2. portcullis.local.toml (gitignored, local overrides)
//! 3. portcullis.toml (git-tracked, project config)
//! 4. ~/.config/portcullis/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)
//!
//! ```toml
//! [audit]
//! enabled = true
//!
//! [store]
//! seed_file = "rbac.toml"
//!
//! [roles]
//! listing = "public"   # or "admin-only"
//!
//! [logging]
//! filter = "info"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Portcullis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortcullisConfig {
    pub audit: AuditConfig,
    pub store: StoreConfig,
    pub roles: RolesConfig,
    pub logging: LoggingConfig,
}

/// Decision logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// TOML fixture provisioning roles, permissions and assignments.
    /// Relative paths are resolved against the project directory.
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    pub listing: RoleListing,
}

/// Who may list the role catalogue.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RoleListing {
    /// Any caller, signed in or not.
    #[default]
    Public,
    /// Authenticated admin-tier callers only.
    AdminOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl PortcullisConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Create a configuration for tests: no audit logging, no seed.
    pub fn testing() -> Self {
        Self {
            audit: AuditConfig { enabled: false },
            ..Default::default()
        }
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if let Some(seed_file) = &self.store.seed_file {
            if seed_file.is_relative() {
                self.store.seed_file = Some(base.join(seed_file));
            }
        }
    }
}
