mod file_config;

pub use file_config::FileConfig;

use crate::catalog_api::{SpotifySettings, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL};
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "track_collector.db";
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = 100;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub db_path: Option<PathBuf>,
    pub market: Option<String>,
    pub request_timeout_sec: u64,
    pub min_request_interval_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            db_path: None,
            market: None,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            min_request_interval_ms: DEFAULT_MIN_REQUEST_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub db_path: PathBuf,
    pub api_base_url: String,
    pub auth_url: String,
    pub request_timeout_sec: u64,
    pub min_request_interval_ms: u64,
    pub market: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    ///
    /// Credentials are not checked here: commands that never reach the
    /// catalog API run without them.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let client_id = file.client_id.or_else(|| cli.client_id.clone());
        let client_secret = file.client_secret.or_else(|| cli.client_secret.clone());

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let api_base_url = file
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let auth_url = file.auth_url.unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());

        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than zero");
        }
        let min_request_interval_ms = file
            .min_request_interval_ms
            .unwrap_or(cli.min_request_interval_ms);

        let market = file
            .market
            .or_else(|| cli.market.clone())
            .filter(|m| !m.trim().is_empty());

        Ok(AppConfig {
            client_id,
            client_secret,
            db_path,
            api_base_url,
            auth_url,
            request_timeout_sec,
            min_request_interval_ms,
            market,
        })
    }

    pub fn spotify_settings(&self) -> SpotifySettings {
        SpotifySettings {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            api_base_url: self.api_base_url.clone(),
            auth_url: self.auth_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_sec),
            min_request_interval: Duration::from_millis(self.min_request_interval_ms),
            market: self.market.clone(),
        }
    }
}
