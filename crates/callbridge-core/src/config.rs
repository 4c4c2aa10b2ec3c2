//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub telephony: TelephonyConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Telephony configuration injected into the call router.
///
/// Kept explicit (no ambient globals) so routing decisions are deterministic
/// under test.
#[derive(Debug, Deserialize, Clone)]
pub struct TelephonyConfig {
    /// Verified caller-ID number presented on PSTN calls.
    ///
    /// PSTN calls with an unverified caller ID are typically rejected by the
    /// provider; when this is unset the router falls back to the raw caller
    /// identity and logs a warning instead of failing the call.
    pub verified_caller_id: Option<String>,

    /// Base URL pushed to the provider for call-status events on PSTN dials
    pub status_callback_url: Option<String>,

    /// Language for spoken fallback messages
    #[serde(default = "default_voice_language")]
    pub voice_language: String,

    /// Seconds to ring the far end before giving up
    #[serde(default = "default_dial_timeout")]
    pub dial_timeout_secs: u32,
}

fn default_voice_language() -> String {
    "en-US".to_string()
}

fn default_dial_timeout() -> u32 {
    20
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            verified_caller_id: None,
            status_callback_url: None,
            voice_language: default_voice_language(),
            dial_timeout_secs: default_dial_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("telephony.voice_language", "en-US")?
            .set_default("telephony.dial_timeout_secs", 20)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with CALLBRIDGE_ prefix
            .add_source(
                Environment::with_prefix("CALLBRIDGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
