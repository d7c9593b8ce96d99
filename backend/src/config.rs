//! Process configuration read from environment variables at startup.
//!
//! Every setting has a default that is logged when the variable is absent, so
//! a bare `cargo run` starts a server against `./data` with no drive access
//! token. Remote calls then fail and are reported as remote service errors.

use crate::job_controller::flusher::{FlushConfig, RetryPolicy};
use common::responses::AdminCredentials;
use log::{info, warn};
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com";

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub admin: Option<AdminCredentials>,
    pub drive_api_base: String,
    pub drive_access_token: String,
    pub flush: FlushConfig,
}

impl AppConfig {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let admin_username = var("ADMIN_USERNAME").or_else(|| var("ADMIN_NAME"));
        let admin = match (admin_username, var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            _ => {
                warn!("Admin credentials are not configured; admin login is disabled");
                None
            }
        };

        let drive_access_token = var("DRIVE_ACCESS_TOKEN").unwrap_or_else(|| {
            warn!("DRIVE_ACCESS_TOKEN not set, drive requests will be rejected");
            String::new()
        });

        let flush = FlushConfig {
            interval: Duration::from_secs(try_load(&var, "FLUSH_INTERVAL_SECS", 30)),
            fast_interval: Duration::from_secs(try_load(&var, "FLUSH_FAST_INTERVAL_SECS", 5)),
            max_batch_size: try_load(&var, "FLUSH_MAX_BATCH", 50),
            immediate_threshold: try_load(&var, "FLUSH_IMMEDIATE_THRESHOLD", 10),
            retry: RetryPolicy {
                max_attempts: try_load(&var, "FLUSH_MAX_ATTEMPTS", 3),
                base_delay: Duration::from_millis(try_load(&var, "FLUSH_BASE_DELAY_MS", 200)),
            },
        };

        Self {
            host: try_load(&var, "HOST", "0.0.0.0".to_string()),
            port: try_load(&var, "PORT", 5000),
            data_dir: PathBuf::from(try_load(&var, "DATA_DIR", "./data".to_string())),
            admin,
            drive_api_base: try_load(&var, "DRIVE_API_BASE", DEFAULT_DRIVE_API_BASE.to_string()),
            drive_access_token,
            flush,
        }
    }
}

fn try_load<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
