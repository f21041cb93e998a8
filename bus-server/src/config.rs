//! Application configuration, read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::FixedOffset;
use tracing::warn;

/// Singapore Standard Time, the offset DataMall schedules are published in.
const SGT_OFFSET_SECS: i32 = 8 * 3600;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

const DEFAULT_STATIC_DIR: &str = "static";

/// Errors in configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// DataMall AccountKey (may be empty in mock mode)
    pub account_key: String,
    /// Override for the DataMall base URL
    pub base_url: Option<String>,
    /// Serve DataMall responses from this fixture directory instead
    pub mock_dir: Option<PathBuf>,
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Static assets directory
    pub static_dir: PathBuf,
    /// Local offset used for "now"
    pub utc_offset: FixedOffset,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup (for testing).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mock_dir = lookup("DATAMALL_MOCK_DIR")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let account_key = lookup("DATAMALL_ACCOUNT_KEY").unwrap_or_default();
        if account_key.is_empty() && mock_dir.is_none() {
            warn!("DATAMALL_ACCOUNT_KEY not set. API calls will fail.");
        }

        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind.clone(),
        })?;

        let utc_offset = FixedOffset::east_opt(SGT_OFFSET_SECS).ok_or(ConfigError::Invalid {
            name: "UTC offset",
            value: SGT_OFFSET_SECS.to_string(),
        })?;

        Ok(Self {
            account_key,
            base_url: lookup("DATAMALL_BASE_URL").filter(|s| !s.is_empty()),
            mock_dir,
            bind_addr,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            utc_offset,
        })
    }
}
