//! Inbox watcher: polls the upload folder and feeds settled files to the
//! pipeline.
//!
//! A file is dispatched only after its size is unchanged across two
//! consecutive polls, so half-written recordings are never uploaded. Each
//! file is processed by one spawned task at a time (the in-flight set
//! serializes per filename) and is attempted once per appearance: after a
//! terminal error or duplicate skip it stays in the inbox, and re-presenting
//! it (touch, rename, or restart) retries it. Only files that reach `Done`
//! are moved to the done folder.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::orchestrator::{Pipeline, PipelineError, PipelineOutcome};

#[derive(Clone, Debug)]
pub struct WatcherConfig {
    pub upload_dir: PathBuf,
    pub done_dir: PathBuf,
    pub poll_interval: Duration,
}

#[derive(Default)]
struct WatchState {
    /// Sizes observed on the previous poll, for write-finish settling.
    pending: HashMap<PathBuf, u64>,
    /// Files currently being processed by a spawned task.
    in_flight: HashSet<PathBuf>,
    /// Files that reached a terminal state but stayed in the inbox
    /// (errors and duplicate skips); not re-attempted until re-presented.
    attempted: HashSet<PathBuf>,
}

pub struct InboxWatcher {
    pipeline: Arc<Pipeline>,
    config: WatcherConfig,
    state: Arc<Mutex<WatchState>>,
}

impl InboxWatcher {
    pub fn new(pipeline: Arc<Pipeline>, config: WatcherConfig) -> Self {
        Self {
            pipeline,
            config,
            state: Arc::new(Mutex::new(WatchState::default())),
        }
    }

    /// Poll until a shutdown message arrives.
    pub async fn run(&self, mut shutdown_rx: mpsc::Receiver<()>) {
        tracing::info!(
            upload_dir = %self.config.upload_dir.display(),
            done_dir = %self.config.done_dir.display(),
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Inbox watcher started"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Inbox watcher shutting down");
                    break;
                }
                _ = sleep(self.config.poll_interval) => {
                    match scan_dir(&self.config.upload_dir).await {
                        Ok(listing) => {
                            let settled = {
                                let mut state = self.state.lock().unwrap();
                                settle(listing, &mut state)
                            };
                            for path in settled {
                                self.dispatch(path);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Inbox scan failed");
                        }
                    }
                }
            }
        }
    }

    fn dispatch(&self, path: PathBuf) {
        let pipeline = Arc::clone(&self.pipeline);
        let state = Arc::clone(&self.state);
        let done_dir = self.config.done_dir.clone();

        tokio::spawn(async move {
            tracing::info!(file = %path.display(), "File settled, starting pipeline");
            let stays_in_inbox = match pipeline.process_file(&path).await {
                Ok(PipelineOutcome::Done { backup_url }) => {
                    tracing::info!(
                        file = %path.display(),
                        backup = backup_url.is_some(),
                        "Pipeline done"
                    );
                    !relocate_to_done(&path, &done_dir).await
                }
                Ok(PipelineOutcome::DuplicateSkip) => true,
                Err(e) => {
                    match &e {
                        PipelineError::Persist { .. } => {
                            tracing::error!(error = %e, file = %path.display(), "Pipeline failed")
                        }
                        _ => tracing::warn!(
                            error = %e,
                            file = %path.display(),
                            "Pipeline failed, file left for reprocessing"
                        ),
                    }
                    true
                }
            };

            let mut state = state.lock().unwrap();
            state.in_flight.remove(&path);
            if stays_in_inbox {
                state.attempted.insert(path);
            }
        });
    }
}

/// Move a finished file to the done folder. Returns whether the move
/// succeeded; a failed move leaves the file in the inbox and it will not be
/// re-attempted until re-presented.
async fn relocate_to_done(path: &Path, done_dir: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let target = done_dir.join(name);
    match tokio::fs::rename(path, &target).await {
        Ok(()) => {
            tracing::info!(to = %target.display(), "Moved uploaded file to done folder");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, file = %path.display(), "Failed to move uploaded file");
            false
        }
    }
}

/// Non-recursive listing of regular files and their sizes.
async fn scan_dir(dir: &Path) -> std::io::Result<Vec<(PathBuf, u64)>> {
    let mut listing = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if metadata.is_file() {
            listing.push((entry.path(), metadata.len()));
        }
    }
    Ok(listing)
}

/// Compare this poll's listing with the previous one and return the files
/// whose size held stable. Files in flight or already attempted are ignored;
/// a file that vanished from the listing is forgotten entirely, so a
/// re-presented file starts fresh.
fn settle(listing: Vec<(PathBuf, u64)>, state: &mut WatchState) -> Vec<PathBuf> {
    let mut settled = Vec::new();
    let mut next_pending = HashMap::new();
    let mut present = HashSet::new();

    for (path, size) in listing {
        present.insert(path.clone());
        if state.in_flight.contains(&path) || state.attempted.contains(&path) {
            continue;
        }
        match state.pending.get(&path) {
            Some(previous) if *previous == size => {
                state.in_flight.insert(path.clone());
                settled.push(path);
            }
            _ => {
                next_pending.insert(path, size);
            }
        }
    }

    state.pending = next_pending;
    state.attempted.retain(|path| present.contains(path));
    settled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> PathBuf {
        PathBuf::from(format!("/inbox/{name}"))
    }

    #[test]
    fn files_settle_only_after_a_stable_size() {
        let mut state = WatchState::default();

        let settled = settle(vec![(p("a.mp4"), 100)], &mut state);
        assert!(settled.is_empty(), "first sighting must not settle");

        let settled = settle(vec![(p("a.mp4"), 150)], &mut state);
        assert!(settled.is_empty(), "growing file must not settle");

        let settled = settle(vec![(p("a.mp4"), 150)], &mut state);
        assert_eq!(settled, vec![p("a.mp4")]);
        assert!(state.in_flight.contains(&p("a.mp4")));
    }

    #[test]
    fn in_flight_and_attempted_files_are_skipped() {
        let mut state = WatchState::default();
        state.in_flight.insert(p("busy.mp4"));
        state.attempted.insert(p("failed.mp4"));

        // Stable across two polls, but both should still be ignored.
        settle(vec![(p("busy.mp4"), 10), (p("failed.mp4"), 10)], &mut state);
        let settled = settle(vec![(p("busy.mp4"), 10), (p("failed.mp4"), 10)], &mut state);
        assert!(settled.is_empty());
    }

    #[test]
    fn vanished_attempted_files_are_forgotten() {
        let mut state = WatchState::default();
        state.attempted.insert(p("gone.mp4"));

        settle(vec![], &mut state);
        assert!(
            !state.attempted.contains(&p("gone.mp4")),
            "a file removed from the inbox can be re-presented later"
        );
    }

    #[tokio::test]
    async fn scan_dir_lists_regular_files_with_sizes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.mp4"), [0u8; 42]).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let listing = scan_dir(dir.path()).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].0.file_name().unwrap(), "x.mp4");
        assert_eq!(listing[0].1, 42);
    }
}
