//! Resumable upload protocol shared by both channels.

use std::path::Path;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use tokio_util::io::ReaderStream;

use crate::error::UploadError;

/// Upload initiation endpoint. `uploadType=resumable` selects the two-step
/// protocol: metadata POST, then a byte PUT to the session URL returned in
/// the `Location` header.
const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";

/// Advisory byte-progress callback: `(bytes_sent, total_bytes)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Canonical watch URL for an uploaded video.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Run the two-step resumable upload and return the new video id.
pub(crate) async fn resumable_upload(
    client: &reqwest::Client,
    access_token: &str,
    path: &Path,
    metadata: serde_json::Value,
    progress: Option<ProgressFn>,
) -> Result<String, UploadError> {
    let file_size = tokio::fs::metadata(path).await?.len();

    let init = client
        .post(UPLOAD_ENDPOINT)
        .bearer_auth(access_token)
        .header("X-Upload-Content-Type", "video/*")
        .header("X-Upload-Content-Length", file_size.to_string())
        .json(&metadata)
        .send()
        .await?;

    if !init.status().is_success() {
        return Err(rejected(init).await);
    }

    let session_url = init
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(UploadError::NoUploadUrl)?;

    let file = tokio::fs::File::open(path).await?;
    let progress = progress.unwrap_or_else(|| Arc::new(|_, _| {}));
    let stream = progress_stream(ReaderStream::new(file), file_size, progress);

    let response = client
        .put(&session_url)
        .bearer_auth(access_token)
        .header(CONTENT_TYPE, "video/*")
        .header(CONTENT_LENGTH, file_size.to_string())
        .body(reqwest::Body::wrap_stream(stream))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(rejected(response).await);
    }

    let body: serde_json::Value = response.json().await?;
    match body.get("id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(UploadError::NoVideoId),
    }
}

async fn rejected(response: reqwest::Response) -> UploadError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    UploadError::Rejected { status, body }
}

/// Wrap a byte stream so each yielded chunk advances the progress callback.
fn progress_stream<S, B, E>(
    inner: S,
    total: u64,
    progress: ProgressFn,
) -> impl Stream<Item = Result<B, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    let mut sent = 0u64;
    inner.map(move |chunk| {
        if let Ok(bytes) = &chunk {
            sent += bytes.as_ref().len() as u64;
            progress(sent, total);
        }
        chunk
    })
}
