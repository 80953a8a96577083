/// Configuration management for the PulseFit client data layer
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    pub api: ApiConfig,
    /// View-cache settings
    pub cache: CacheConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the PulseFit REST backend
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// View-cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached user profiles (seconds)
    #[serde(default = "default_user_ttl")]
    pub user_ttl_secs: u64,
    /// TTL for cached user directory pages (seconds)
    #[serde(default = "default_list_ttl")]
    pub list_ttl_secs: u64,
}

// Default values
fn default_timeout_secs() -> u64 {
    10
}

fn default_user_ttl() -> u64 {
    pulsefit_cache::ttl::USER
}

fn default_list_ttl() -> u64 {
    pulsefit_cache::ttl::USER_LIST
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api = ApiConfig {
            base_url: std::env::var("PULSEFIT_API_URL")
                .context("PULSEFIT_API_URL environment variable not set")?,
            timeout_secs: std::env::var("PULSEFIT_API_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_timeout_secs),
        };

        let cache = CacheConfig {
            user_ttl_secs: std::env::var("PULSEFIT_USER_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_user_ttl),
            list_ttl_secs: std::env::var("PULSEFIT_LIST_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_list_ttl),
        };

        Ok(Config { api, cache })
    }
}
