//! Image upload endpoints
//!
//! - `POST /api/upload` single image, optional background removal
//! - `POST /api/upload-multiple` up to [`MAX_BATCH_FILES`] images, stored as-is
//! - `GET /api/uploads` local listing
//! - `DELETE /api/upload/:filename`
//! - `GET /uploads/:filename` local file, else the mirror

use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use cosmic_media::naming::content_type_for;
use cosmic_media::sink::LocalUpload;
use cosmic_media::validation::validate_upload;
use cosmic_media::{FetchSource, IncomingImage, StorageFolder, StrategyKind, UploadOptions, UploadReceipt};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

pub const MAX_BATCH_FILES: usize = 10;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// Local URL (the authoritative copy)
    pub url: String,
    pub supabase_url: Option<String>,
    pub local_url: String,
    pub filename: String,
    pub original_name: String,
    pub folder: String,
    pub background_removed: bool,
    pub strategy: StrategyKind,
    /// Size of the file as uploaded
    pub size: usize,
    pub storage: &'static str,
}

impl From<UploadReceipt> for UploadResponse {
    fn from(receipt: UploadReceipt) -> Self {
        let background_removed = receipt.background_removed();
        let message = if background_removed {
            "File uploaded successfully with background removal"
        } else {
            "File uploaded successfully"
        };
        Self {
            success: true,
            message: message.to_string(),
            url: receipt.write.local_url.clone(),
            supabase_url: receipt.write.mirror_url.clone(),
            storage: receipt.write.storage_label(),
            local_url: receipt.write.local_url,
            filename: receipt.write.filename,
            original_name: receipt.original_name,
            folder: receipt.folder.to_string(),
            background_removed,
            strategy: receipt.strategy,
            size: receipt.original_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub url: String,
    pub supabase_url: Option<String>,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> ApiResult<IncomingImage> {
    let original_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    let bytes = field.bytes().await?;
    Ok(IncomingImage {
        original_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

/// POST /api/upload
pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<UploadResponse>> {
    let mut file = None;
    let mut options = UploadOptions::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => file = Some(read_file(field).await?),
            "folder" => {
                let folder = field.text().await?;
                options.folder = Some(folder.trim().to_string()).filter(|f| !f.is_empty());
            }
            "removeBackground" => options.remove_background = field.text().await?.trim() == "true",
            other => debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    let incoming = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let receipt = state.uploads.process(incoming, options).await?;

    info!(
        file = %receipt.write.filename,
        storage = receipt.write.storage_label(),
        background_removed = receipt.background_removed(),
        "Upload complete"
    );
    Ok(Json(receipt.into()))
}

/// POST /api/upload-multiple
pub async fn upload_multiple(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<Value>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("files") {
            continue;
        }
        if files.len() == MAX_BATCH_FILES {
            return Err(ApiError::BadRequest(format!(
                "Too many files. Maximum is {}",
                MAX_BATCH_FILES
            )));
        }
        files.push(read_file(field).await?);
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    // Reject the whole batch before anything is written
    let max = state.uploads.max_file_size();
    for file in &files {
        validate_upload(&file.original_name, &file.content_type, file.bytes.len(), max)?;
    }

    let mut stored = Vec::with_capacity(files.len());
    let mut all_mirrored = true;
    for file in files {
        let receipt = state.uploads.store_plain(file, StorageFolder::Others).await?;
        all_mirrored &= receipt.write.mirror_url.is_some();
        stored.push(StoredFile {
            url: receipt.write.local_url,
            supabase_url: receipt.write.mirror_url,
            filename: receipt.write.filename,
            original_name: receipt.original_name,
            size: receipt.original_size,
        });
    }

    info!(count = stored.len(), "Batch upload complete");
    Ok(Json(json!({
        "success": true,
        "message": format!("{} files uploaded successfully", stored.len()),
        "files": stored,
        "storage": if all_mirrored { "local+supabase" } else { "local" },
    })))
}

/// GET /api/uploads
pub async fn list_uploads(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let files: Vec<LocalUpload> = state.uploads.sink().list().await?;
    Ok(Json(json!({ "success": true, "files": files })))
}

/// DELETE /api/upload/:filename
pub async fn delete_upload(State(state): State<AppState>, Path(filename): Path<String>) -> ApiResult<Json<Value>> {
    state.uploads.sink().delete(&filename).await?;
    Ok(Json(json!({ "success": true, "message": "File deleted successfully" })))
}

/// GET /uploads/:filename
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let fetched = state
        .uploads
        .sink()
        .fetch(&filename)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    if let FetchSource::Mirror(folder) = fetched.source {
        debug!(file = %filename, folder = %folder, "Serving upload from mirror");
    }

    Ok(([(header::CONTENT_TYPE, content_type_for(&filename))], fetched.bytes))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_image))
        .route("/api/upload-multiple", post(upload_multiple))
        .route("/api/upload/:filename", delete(delete_upload))
        .route("/api/uploads", get(list_uploads))
        .route("/uploads/:filename", get(serve_upload))
}
