//! # Cosmic Common Library
//!
//! Shared code for the Cosmic Astrology backend crates:
//! - Error and result types
//! - Configuration loading (CLI > environment > TOML > defaults)
//! - Hosted backend clients (REST rows and object storage)
//! - In-memory stores used when the hosted backend is not configured

pub mod config;
pub mod error;
pub mod store;
pub mod supabase;

pub use error::{Error, Result};
pub use store::{ContentStore, Filter, ObjectStore, Query, Row};
