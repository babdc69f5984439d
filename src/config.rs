// src/config.rs
use log::warn;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_WORLD_BANK_URL: &str = "https://api.worldbank.org/v2/country/";
pub const DEFAULT_ALPHAVANTAGE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_CACHE_PATH: &str = "cache/valuator.json";

/// Runtime configuration, read once at startup and passed into the
/// services by the caller. Base URLs are overridable so tests can point
/// the services at a local mock server.
#[derive(Debug, Clone)]
pub struct Config {
    pub worldbank_url: String,
    pub alphavantage_url: String,
    pub alphavantage_key: String,
    pub cache_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let alphavantage_key = env::var("ALPHAVANTAGE_API_KEY").unwrap_or_else(|_| {
            warn!("$ALPHAVANTAGE_API_KEY not set, using the 'demo' key (heavily rate-limited)");
            "demo".to_string()
        });

        let cache_path = env::var("VALUATOR_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_PATH));

        Config {
            worldbank_url: env::var("WORLDBANK_URL")
                .unwrap_or_else(|_| DEFAULT_WORLD_BANK_URL.to_string()),
            alphavantage_url: env::var("ALPHAVANTAGE_URL")
                .unwrap_or_else(|_| DEFAULT_ALPHAVANTAGE_URL.to_string()),
            alphavantage_key,
            cache_path,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            worldbank_url: DEFAULT_WORLD_BANK_URL.to_string(),
            alphavantage_url: DEFAULT_ALPHAVANTAGE_URL.to_string(),
            alphavantage_key: "demo".to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
        }
    }
}
