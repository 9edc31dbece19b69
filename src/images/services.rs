use bytes::Bytes;
use tracing::{info, warn};

use crate::storage::UploadError;
use crate::state::AppState;

/// A file received from a client, ready to be relayed.
pub struct UploadItem {
    pub filename: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Forwards `item` to object storage and returns the public URL.
/// No retries: the first failure is returned.
pub async fn relay_upload(st: &AppState, item: UploadItem) -> Result<String, UploadError> {
    let size = item.body.len();
    match st
        .storage
        .upload(&item.filename, &item.content_type, item.body)
        .await
    {
        Ok(url) => {
            info!(filename = %item.filename, size, "image relayed");
            Ok(url)
        }
        Err(e) => {
            warn!(filename = %item.filename, error = %e, "image relay failed");
            Err(e)
        }
    }
}
