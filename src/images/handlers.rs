use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, instrument, warn};

use super::services::{relay_upload, UploadItem};
use crate::{
    auth::extractors::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
    storage::UploadError,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// POST /upload (multipart). Field: `file`.
#[instrument(skip(state, _caller, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    _caller: CurrentUser,
    mut mp: Multipart,
) -> ApiResult<Json<Value>> {
    let item = read_file_field(&mut mp).await?;

    let url = relay_upload(&state, item).await.map_err(|e| match e {
        UploadError::Rejected(_) => ApiError::Upstream(e.to_string()),
        UploadError::Transport(err) => {
            error!(error = %err, "storage unreachable");
            ApiError::Internal("failed to upload image".into())
        }
    })?;

    Ok(Json(json!({ "data": { "url": url } })))
}

async fn read_file_field(mp: &mut Multipart) -> ApiResult<UploadItem> {
    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::invalid_format()),
            Err(e) => {
                warn!(error = %e, "malformed multipart body");
                return Err(ApiError::invalid_format());
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(ApiError::invalid_format()),
        };
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await.map_err(|e| {
            warn!(error = %e, "reading upload failed");
            ApiError::invalid_format()
        })?;

        return Ok(UploadItem {
            filename,
            content_type,
            body,
        });
    }
}
