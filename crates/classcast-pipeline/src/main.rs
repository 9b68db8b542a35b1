use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use classcast_core::{Config, ExtractorConfig, SubjectMap};
use classcast_db::{connect_pool, SqlRecordingStore};
use classcast_pipeline::{InboxWatcher, Pipeline, WatcherConfig};
use classcast_uploader::{BackupUploader, PrimaryUploader};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let pool = connect_pool(&config).await?;
    let store = Arc::new(SqlRecordingStore::new(pool));

    let upload_timeout = Duration::from_secs(config.upload_timeout_seconds);
    let primary = PrimaryUploader::new(config.youtube_access_token.clone(), upload_timeout)
        .context("failed to build primary upload client")?
        .with_progress(Arc::new(|sent, total| {
            if total > 0 {
                tracing::debug!(percent = sent * 100 / total, "Upload progress");
            }
        }));
    let backup = BackupUploader::new(config.backup_access_token.clone(), upload_timeout)
        .context("failed to build backup upload client")?;

    let pipeline = Arc::new(Pipeline::new(
        store,
        Arc::new(primary),
        Arc::new(backup),
        SubjectMap::default(),
        ExtractorConfig::default(),
    ));

    tokio::fs::create_dir_all(&config.done_dir)
        .await
        .with_context(|| format!("failed to create done dir {}", config.done_dir.display()))?;

    let watcher = InboxWatcher::new(
        pipeline,
        WatcherConfig {
            upload_dir: config.upload_dir.clone(),
            done_dir: config.done_dir.clone(),
            poll_interval: Duration::from_millis(config.watch_poll_interval_ms),
        },
    );

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            let _ = shutdown_tx.send(()).await;
        }
    });

    watcher.run(shutdown_rx).await;
    Ok(())
}
