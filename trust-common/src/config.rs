//! Configuration loading for trustcheck
//!
//! Resolution priority for every key:
//! 1. Environment variable (`TRUSTCHECK_*`)
//! 2. TOML config file (`~/.config/trustcheck/config.toml`)
//! 3. Compiled default

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default Ethos API base URL
pub const DEFAULT_API_BASE: &str = "https://api.ethos.network";

/// Client identifier sent as the `X-Ethos-Client` header on every request
pub const DEFAULT_CLIENT_ID: &str = "ethos-trust-checker-app@1.0.0";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Ethos reputation API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Value of the `X-Ethos-Client` request header
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Column name holding addresses in uploaded tabular files
    #[serde(default = "default_address_column")]
    pub address_column: String,

    /// Bind outbound sockets to IPv4. The Ethos hostname resolves
    /// unreliably over IPv6 in some environments.
    #[serde(default = "default_force_ipv4")]
    pub force_ipv4: bool,

    /// Per-request timeout for reputation API calls (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// CORS allowed origin for the frontend; None allows any origin
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

fn default_port() -> u16 {
    3000
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_address_column() -> String {
    "address".to_string()
}

fn default_force_ipv4() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            api_base: default_api_base(),
            client_id: default_client_id(),
            address_column: default_address_column(),
            force_ipv4: default_force_ipv4(),
            request_timeout_secs: default_request_timeout_secs(),
            allowed_origin: None,
        }
    }
}

impl TrustConfig {
    /// Load configuration with tiered resolution: ENV → TOML → defaults
    pub fn load() -> Self {
        let mut config = match load_toml_config() {
            Ok(Some(config)) => {
                info!("Configuration loaded from TOML file");
                config
            }
            Ok(None) => TrustConfig::default(),
            Err(e) => {
                warn!("Config file unreadable, using defaults: {}", e);
                TrustConfig::default()
            }
        };

        config.apply_env_overrides();
        config
    }

    /// Apply `TRUSTCHECK_*` environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("TRUSTCHECK_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid TRUSTCHECK_PORT: {}", port),
            }
        }
        if let Ok(api_base) = std::env::var("TRUSTCHECK_API_BASE") {
            self.api_base = api_base;
        }
        if let Ok(client_id) = std::env::var("TRUSTCHECK_CLIENT_ID") {
            self.client_id = client_id;
        }
        if let Ok(column) = std::env::var("TRUSTCHECK_ADDRESS_COLUMN") {
            self.address_column = column;
        }
        if let Ok(force_ipv4) = std::env::var("TRUSTCHECK_FORCE_IPV4") {
            self.force_ipv4 = matches!(force_ipv4.as_str(), "1" | "true" | "yes");
        }
        if let Ok(timeout) = std::env::var("TRUSTCHECK_REQUEST_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid TRUSTCHECK_REQUEST_TIMEOUT_SECS: {}", timeout),
            }
        }
        if let Ok(origin) = std::env::var("TRUSTCHECK_ALLOWED_ORIGIN") {
            self.allowed_origin = Some(origin);
        }
    }
}

/// Platform config file path: `~/.config/trustcheck/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trustcheck").join("config.toml"))
}

/// Read and parse the TOML config file, if one exists
fn load_toml_config() -> Result<Option<TrustConfig>> {
    let Some(path) = config_file_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    Ok(Some(config))
}
