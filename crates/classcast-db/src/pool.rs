//! Connection pool setup.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use classcast_core::Config;

/// Connect a bounded MySQL pool from environment configuration.
///
/// Connection parameters are passed as typed options, never interpolated
/// into a URL, so credentials with reserved characters survive intact.
pub async fn connect_pool(config: &Config) -> Result<MySqlPool> {
    let options = MySqlConnectOptions::new()
        .host(&config.db_host)
        .username(&config.db_user)
        .password(&config.db_password)
        .database(&config.db_name);

    let pool = MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect_with(options)
        .await
        .with_context(|| {
            format!(
                "failed to connect to MySQL at {} (database {})",
                config.db_host, config.db_name
            )
        })?;

    tracing::info!(
        host = %config.db_host,
        database = %config.db_name,
        max_connections = config.db_max_connections,
        "Connected to MySQL"
    );

    Ok(pool)
}
