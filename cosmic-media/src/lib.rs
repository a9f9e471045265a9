//! # Cosmic Media
//!
//! Image upload pipeline for the Cosmic Astrology backend:
//! - [`folders`]: logical category → physical storage folder
//! - [`normalize`]: decode any accepted upload into a clean RGBA PNG
//! - [`removal`]: ranked background-removal strategies
//! - [`sink`]: local (authoritative) + object-store mirror (best effort) writes
//! - [`pipeline`]: the end-to-end upload flow

pub mod error;
pub mod folders;
pub mod naming;
pub mod normalize;
pub mod pipeline;
pub mod removal;
pub mod sink;
pub mod validation;

pub use error::{MediaError, Result};
pub use folders::StorageFolder;
pub use pipeline::{IncomingImage, UploadOptions, UploadPipeline, UploadReceipt};
pub use removal::{BackgroundRemover, RemovalOutcome, StrategyKind, TransparencyStrategy};
pub use sink::{DualSinkWriter, FetchSource, WriteReceipt};
