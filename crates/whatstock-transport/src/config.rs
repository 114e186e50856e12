//! # Application Configuration
//!
//! Configuration for transport selection, storage location, and the
//! served-mode HTTP server.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WHATSTOCK_MODE=served                                              │
//! │     WHATSTOCK_BASE_URL=http://127.0.0.1:5000                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/whatstock/whatstock.toml (Linux)                         │
//! │     ~/Library/Application Support/com.whatstock.whatstock/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     TransportMode::Auto, 127.0.0.1:5000                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [transport]
//! mode = "auto"            # auto | hosted | served
//! base_url = "http://127.0.0.1:5000"
//! api_root = "/api"
//! request_timeout_secs = 30
//!
//! [storage]
//! database_path = "/var/lib/whatstock/whatstock.db"
//!
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{TransportError, TransportResult};

// =============================================================================
// Transport Mode
// =============================================================================

/// Which transport the request façade should use.
///
/// ## Mode Selection
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  AUTO (Default)                                                        │
/// │  • Asks the EnvironmentProbe once at startup                           │
/// │  • Inside the desktop shell → hosted, otherwise → served               │
/// │                                                                         │
/// │  HOSTED (Forced)                                                       │
/// │  • Requests are answered in-process by the local router                │
/// │  • No network I/O at all                                               │
/// │                                                                         │
/// │  SERVED (Forced)                                                       │
/// │  • Requests go over HTTP to base_url                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Decide from the runtime environment.
    #[default]
    Auto,

    /// In-process local store.
    Hosted,

    /// Remote HTTP server.
    Served,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Auto => write!(f, "auto"),
            TransportMode::Hosted => write!(f, "hosted"),
            TransportMode::Served => write!(f, "served"),
        }
    }
}

impl std::str::FromStr for TransportMode {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(TransportMode::Auto),
            "hosted" | "local" | "desktop" => Ok(TransportMode::Hosted),
            "served" | "http" | "web" => Ok(TransportMode::Served),
            other => Err(TransportError::InvalidConfig(format!(
                "Unknown transport mode: '{}'. Valid options: auto, hosted, served",
                other
            ))),
        }
    }
}

// =============================================================================
// Transport Settings
// =============================================================================

/// Request façade settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Transport selection mode.
    #[serde(default)]
    pub mode: TransportMode,

    /// Server origin for served mode, without the API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix of every inventory endpoint.
    #[serde(default = "default_api_root")]
    pub api_root: String,

    /// Per-request timeout for served mode (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_api_root() -> String {
    whatstock_core::API_ROOT.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for TransportSettings {
    fn default() -> Self {
        TransportSettings {
            mode: TransportMode::default(),
            base_url: default_base_url(),
            api_root: default_api_root(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl TransportSettings {
    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the local store keeps its database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Explicit database file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl StorageSettings {
    /// Resolves the database file, falling back to `./whatstock.db` when no
    /// platform data directory is available.
    pub fn resolve_database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "whatstock", "whatstock")
            .map(|dirs| dirs.data_dir().join("whatstock.db"))
            .unwrap_or_else(|| PathBuf::from("whatstock.db"))
    }
}

// =============================================================================
// Server Settings
// =============================================================================

/// Served-mode HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 127.0.0.1).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port to listen on. 0 picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Request façade settings.
    #[serde(default)]
    pub transport: TransportSettings,

    /// Local store settings.
    #[serde(default)]
    pub storage: StorageSettings,

    /// HTTP server settings (served mode backend).
    #[serde(default)]
    pub server: ServerSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (whatstock.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> TransportResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> TransportResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| TransportError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TransportResult<()> {
        let url = &self.transport.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(TransportError::InvalidUrl(format!(
                "Base URL must start with http:// or https://, got: {}",
                url
            )));
        }

        if !self.transport.api_root.starts_with('/') {
            return Err(TransportError::InvalidConfig(format!(
                "api_root must start with '/', got: {}",
                self.transport.api_root
            )));
        }

        if self.transport.request_timeout_secs == 0 {
            return Err(TransportError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `WHATSTOCK_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(mode) = lookup("WHATSTOCK_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding transport mode from environment");
                    self.transport.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown transport mode in environment"),
            }
        }

        if let Some(url) = lookup("WHATSTOCK_BASE_URL") {
            debug!(url = %url, "Overriding base URL from environment");
            self.transport.base_url = url;
        }

        if let Some(path) = lookup("WHATSTOCK_DB_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(addr) = lookup("WHATSTOCK_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("WHATSTOCK_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                debug!(port = p, "Overriding server port from environment");
                self.server.port = p;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "whatstock", "whatstock")
            .map(|dirs| dirs.config_dir().join("whatstock.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the configured transport mode.
    pub fn mode(&self) -> TransportMode {
        self.transport.mode
    }

    /// Returns the served-mode base URL.
    pub fn base_url(&self) -> &str {
        &self.transport.base_url
    }
}
