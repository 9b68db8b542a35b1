//! Environment configuration.
//!
//! All settings come from the environment (a local `.env` is honored in
//! development). Database and token variables have no defaults on purpose:
//! starting without them is a configuration error, not something to paper
//! over.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 3_600;

#[derive(Clone, Debug)]
pub struct Config {
    // Relational store
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Inbox watching
    pub upload_dir: PathBuf,
    pub done_dir: PathBuf,
    pub watch_poll_interval_ms: u64,
    // Video hosts. Token acquisition and refresh live outside this process;
    // we only consume the resulting bearer tokens.
    pub youtube_access_token: String,
    pub backup_access_token: String,
    pub upload_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            db_host: require("DB_HOST")?,
            db_user: require("DB_USER")?,
            db_password: require("DB_PASSWORD")?,
            db_name: require("DB_NAME")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DB_TIMEOUT_SECS),
            upload_dir: require("UPLOAD_DIR")?.into(),
            done_dir: require("DONE_DIR")?.into(),
            watch_poll_interval_ms: env::var("WATCH_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            youtube_access_token: require("YOUTUBE_ACCESS_TOKEN")?,
            backup_access_token: require("BACKUP_ACCESS_TOKEN")?,
            upload_timeout_seconds: env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
        })
    }
}

fn require(name: &'static str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} environment variable is not set"))
}
