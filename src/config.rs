//! Configuration management for pdfscope using the prefer crate.
//!
//! Settings are resolved once at process start (defaults, then config file,
//! then environment, then CLI flags) and handed to the API boundary as a
//! plain value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default analysis service endpoint.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default request timeout in seconds. Document analysis is long-running.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Environment variable that overrides the service endpoint.
pub const API_URL_ENV: &str = "PDFSCOPE_API_URL";

const USER_AGENT: &str = concat!("pdfscope/", env!("CARGO_PKG_VERSION"));

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the analysis service (no trailing slash).
    pub api_base_url: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// User agent for HTTP requests.
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    /// Create settings pointing at a specific service endpoint.
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(api_url),
            ..Default::default()
        }
    }

    /// Point at a different service endpoint, keeping everything else.
    pub fn set_api_url(&mut self, api_url: &str) {
        self.api_base_url = normalize_base_url(api_url);
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Apply environment overrides (`PDFSCOPE_API_URL`).
    pub fn apply_env(&mut self) {
        if let Ok(url) = dotenvy::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = normalize_base_url(&url);
            }
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis service endpoint.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers pdfscope config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("pdfscope").await {
            Ok(pref_config) => {
                let api_url: Option<String> = pref_config.get("api_url").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();

                Config {
                    api_url,
                    request_timeout,
                    user_agent,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref url) = self.api_url {
            settings.api_base_url = normalize_base_url(url);
        }
        if let Some(timeout) = self.request_timeout {
            // A zero timeout would fail every request immediately.
            if timeout > 0 {
                settings.request_timeout = timeout;
            }
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
    }
}

/// Load settings from configuration file and environment.
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings.apply_env();
    settings
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
