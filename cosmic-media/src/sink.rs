//! Dual-sink writer
//!
//! The local upload directory is authoritative: a failed local write fails
//! the operation. The object-store mirror is best effort; its failures are
//! logged and show up only as a missing mirror URL.

use crate::error::{MediaError, Result};
use crate::folders::StorageFolder;
use crate::naming::is_safe_filename;
use chrono::{DateTime, Utc};
use cosmic_common::ObjectStore;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// URL prefix under which local uploads are served
pub const LOCAL_URL_PREFIX: &str = "/static/uploads";

/// Result of a successful write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReceipt {
    pub filename: String,
    pub local_path: PathBuf,
    pub local_url: String,
    pub mirror_url: Option<String>,
    pub size: usize,
}

impl WriteReceipt {
    pub fn storage_label(&self) -> &'static str {
        if self.mirror_url.is_some() {
            "local+supabase"
        } else {
            "local"
        }
    }
}

/// Entry in the local upload listing
#[derive(Debug, Clone, Serialize)]
pub struct LocalUpload {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Where a fetched file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Local,
    Mirror(StorageFolder),
}

#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub source: FetchSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    pub local_removed: bool,
    pub mirror_removed: usize,
}

pub struct DualSinkWriter {
    local_dir: PathBuf,
    mirror: Option<Arc<dyn ObjectStore>>,
}

impl DualSinkWriter {
    pub fn new(local_dir: impl Into<PathBuf>, mirror: Option<Arc<dyn ObjectStore>>) -> Self {
        Self {
            local_dir: local_dir.into(),
            mirror,
        }
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    pub fn local_url(filename: &str) -> String {
        format!("{}/{}", LOCAL_URL_PREFIX, filename)
    }

    fn local_path(&self, filename: &str) -> Result<PathBuf> {
        if !is_safe_filename(filename) {
            return Err(MediaError::InvalidFilename(filename.to_string()));
        }
        Ok(self.local_dir.join(filename))
    }

    /// Write locally, then mirror to `<folder>/<filename>`
    pub async fn write(
        &self,
        folder: StorageFolder,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<WriteReceipt> {
        let local_path = self.local_path(filename)?;
        let size = bytes.len();

        let local_write = async {
            tokio::fs::create_dir_all(&self.local_dir).await?;
            tokio::fs::write(&local_path, &bytes).await
        }
        .await;
        if let Err(source) = local_write {
            warn!(path = %local_path.display(), error = %source, "Local write failed");
            return Err(MediaError::LocalWrite {
                path: local_path,
                source,
            });
        }
        info!(path = %local_path.display(), size, "✓ Saved upload locally");

        let mirror_url = match &self.mirror {
            Some(mirror) => {
                let object_path = folder.object_path(filename);
                match mirror.upload(&object_path, bytes, content_type).await {
                    Ok(key) => {
                        info!(path = %object_path, "✓ Mirrored upload");
                        Some(mirror.public_url(&key))
                    }
                    Err(e) => {
                        warn!(path = %object_path, error = %e, "Mirror upload failed (local save succeeded)");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(WriteReceipt {
            filename: filename.to_string(),
            local_path,
            local_url: Self::local_url(filename),
            mirror_url,
            size,
        })
    }

    /// Files in the local upload directory (empty if it does not exist yet)
    pub async fn list(&self) -> Result<Vec<LocalUpload>> {
        let mut entries = match tokio::fs::read_dir(&self.local_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut uploads = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().to_string();
            uploads.push(LocalUpload {
                url: Self::local_url(&filename),
                filename,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        uploads.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(uploads)
    }

    /// Remove locally and from every mirror folder; `NotFound` if neither had it
    pub async fn delete(&self, filename: &str) -> Result<DeleteReport> {
        let local_path = self.local_path(filename)?;

        let local_removed = match tokio::fs::remove_file(&local_path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        let mirror_removed = match &self.mirror {
            Some(mirror) => {
                let paths: Vec<String> = StorageFolder::LOOKUP_ORDER
                    .iter()
                    .map(|f| f.object_path(filename))
                    .collect();
                mirror.remove(&paths).await.unwrap_or_else(|e| {
                    warn!(file = %filename, error = %e, "Mirror delete failed");
                    0
                })
            }
            None => 0,
        };

        if !local_removed && mirror_removed == 0 {
            return Err(MediaError::NotFound(filename.to_string()));
        }

        info!(file = %filename, local_removed, mirror_removed, "Deleted upload");
        Ok(DeleteReport {
            local_removed,
            mirror_removed,
        })
    }

    /// Read by bare filename: local first, then mirror folders in lookup order
    pub async fn fetch(&self, filename: &str) -> Result<Option<FetchedFile>> {
        let local_path = self.local_path(filename)?;

        match tokio::fs::read(&local_path).await {
            Ok(bytes) => {
                return Ok(Some(FetchedFile {
                    bytes,
                    source: FetchSource::Local,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let Some(mirror) = &self.mirror else {
            return Ok(None);
        };

        for folder in StorageFolder::LOOKUP_ORDER {
            match mirror.download(&folder.object_path(filename)).await {
                Ok(Some(bytes)) => {
                    return Ok(Some(FetchedFile {
                        bytes,
                        source: FetchSource::Mirror(folder),
                    }))
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(folder = %folder, file = %filename, error = %e, "Mirror lookup failed");
                }
            }
        }
        Ok(None)
    }
}
