//! Runtime configuration
//!
//! Everything is read from environment variables with logged fallbacks.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub backend_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let backend_url = env::var("EPICOURIER_BACKEND_URL")
            .or_else(|_| env::var("BACKEND_URL"))
            .unwrap_or_else(|_| {
                info!("EPICOURIER_BACKEND_URL not set, using default: {DEFAULT_BACKEND_URL}");
                DEFAULT_BACKEND_URL.to_string()
            });

        Self {
            database_path: database_path(),
            backend_url: backend_url.trim_end_matches('/').to_string(),
            http_timeout: Duration::from_secs(try_load(
                "EPICOURIER_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
        }
    }
}

/// Database path from the environment, or `<project>/data/epicourier.db`
pub fn database_path() -> PathBuf {
    env::var("EPICOURIER_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
                    path = grandparent.to_path_buf();
                }
            }

            path.push("data");
            path.push("epicourier.db");
            path
        })
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => default,
    }
}
