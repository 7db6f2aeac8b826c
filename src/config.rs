//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/graphrepo/config.toml` (XDG) or platform config dir
//! 2. Project config: `.graphrepo.toml`
//! 3. Environment variables: `GRAPHREPO_*`
//!
//! ```toml
//! [neo4j]
//! uri = "bolt://localhost:7687"
//! username = "neo4j"
//! password = "secret"
//! ```
//!
//! The `database`, `fetch_size` and `max_connections` keys are optional and
//! default to the values below.

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub neo4j: Neo4jConfig,
}

/// Neo4j connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`.
    pub uri: String,
    pub username: String,
    pub password: String,
    /// Target database name.
    #[serde(default = "default_database")]
    pub database: String,
    /// Rows fetched per batch when streaming results.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
    /// Upper bound on pooled bolt connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_fetch_size() -> usize {
    200
}

fn default_max_connections() -> usize {
    16
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".graphrepo.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("GRAPHREPO_").split("_"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/graphrepo/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("graphrepo").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("graphrepo").join("config.toml"))
            .unwrap_or_default()
    }
}
