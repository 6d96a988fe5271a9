//! Bazaar Core - data-integrity layer for a small item catalog
//!
//! - SHA256 content-addressed, deduplicated image storage
//! - Category resolution that converges under concurrent writers
//! - SQLite catalog with denormalized item reads and keyword search

pub mod error;
pub mod operations;
pub mod storage;

pub use error::{BazaarError, Result};
pub use operations::*;
pub use storage::{
    CatalogStore, Category, CategoryResolver, DEFAULT_IMAGE_NAME, IMAGE_EXTENSION, ImageStore,
    Item, PutImageResult, compute_hash,
};
