//! Upload pipeline
//!
//! validate → resolve folder → (optional) background removal → unique name
//! → dual-sink write.

use crate::error::Result;
use crate::folders::{forces_background_removal, StorageFolder};
use crate::naming::{sanitize_original_name, transparent_name, unique_filename};
use crate::removal::{BackgroundRemover, FailedAttempt, StrategyKind};
use crate::sink::{DualSinkWriter, WriteReceipt};
use crate::validation::validate_upload;
use tracing::info;

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Logical folder from the upload form
    pub folder: Option<String>,
    /// Client asked for background removal
    pub remove_background: bool,
}

#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Client-supplied name reduced to its final path component
    pub original_name: String,
    pub folder: StorageFolder,
    /// Size of the upload as received
    pub original_size: usize,
    pub content_type: String,
    /// Removal was requested or forced by the folder
    pub removal_requested: bool,
    pub strategy: StrategyKind,
    pub attempts: Vec<FailedAttempt>,
    pub write: WriteReceipt,
}

impl UploadReceipt {
    pub fn background_removed(&self) -> bool {
        self.strategy != StrategyKind::Unchanged
    }
}

pub struct UploadPipeline {
    remover: BackgroundRemover,
    sink: DualSinkWriter,
    max_file_size: usize,
}

impl UploadPipeline {
    pub fn new(remover: BackgroundRemover, sink: DualSinkWriter, max_file_size: usize) -> Self {
        Self {
            remover,
            sink,
            max_file_size,
        }
    }

    pub fn sink(&self) -> &DualSinkWriter {
        &self.sink
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Background-removal strategies that can currently run
    pub fn available_strategies(&self) -> Vec<&'static str> {
        self.remover.available()
    }

    /// Full single-file upload
    pub async fn process(&self, incoming: IncomingImage, options: UploadOptions) -> Result<UploadReceipt> {
        validate_upload(
            &incoming.original_name,
            &incoming.content_type,
            incoming.bytes.len(),
            self.max_file_size,
        )?;

        let original_name = sanitize_original_name(&incoming.original_name);
        let logical = options.folder.as_deref();
        let folder = StorageFolder::resolve(logical);
        let removal_requested = options.remove_background || forces_background_removal(logical);
        let original_size = incoming.bytes.len();

        info!(
            file = %original_name,
            folder = %folder,
            remove_background = removal_requested,
            "Processing upload"
        );

        let (bytes, content_type, strategy, attempts, stored_name) = if removal_requested {
            let outcome = self
                .remover
                .remove(&incoming.bytes, &incoming.content_type, &original_name)
                .await;
            let stored_name = if outcome.is_transformed() {
                transparent_name(&original_name)
            } else {
                original_name.clone()
            };
            (
                outcome.bytes,
                outcome.content_type,
                outcome.strategy,
                outcome.attempts,
                stored_name,
            )
        } else {
            (
                incoming.bytes,
                incoming.content_type,
                StrategyKind::Unchanged,
                Vec::new(),
                original_name.clone(),
            )
        };

        let filename = unique_filename(&stored_name);
        let write = self.sink.write(folder, &filename, bytes, &content_type).await?;

        Ok(UploadReceipt {
            original_name,
            folder,
            original_size,
            content_type,
            removal_requested,
            strategy,
            attempts,
            write,
        })
    }

    /// Store without background removal (batch uploads)
    pub async fn store_plain(&self, incoming: IncomingImage, folder: StorageFolder) -> Result<UploadReceipt> {
        validate_upload(
            &incoming.original_name,
            &incoming.content_type,
            incoming.bytes.len(),
            self.max_file_size,
        )?;

        let original_name = sanitize_original_name(&incoming.original_name);
        let original_size = incoming.bytes.len();
        let filename = unique_filename(&original_name);
        let write = self
            .sink
            .write(folder, &filename, incoming.bytes, &incoming.content_type)
            .await?;

        Ok(UploadReceipt {
            original_name,
            folder,
            original_size,
            content_type: incoming.content_type,
            removal_requested: false,
            strategy: StrategyKind::Unchanged,
            attempts: Vec::new(),
            write,
        })
    }
}
