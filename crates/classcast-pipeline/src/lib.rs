//! Classcast pipeline: the per-file upload orchestrator and the inbox
//! watcher loop that feeds it.

mod orchestrator;
mod watcher;

pub use orchestrator::{Pipeline, PipelineError, PipelineOutcome};
pub use watcher::{InboxWatcher, WatcherConfig};
