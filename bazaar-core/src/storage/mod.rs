//! Storage modules for Bazaar
//!
//! Provides content-addressed image storage and the SQLite catalog.

pub mod catalog_store;
pub mod category;
pub mod image_store;

pub use catalog_store::{CatalogStore, Item};
pub use category::{Category, CategoryResolver};
pub use image_store::{
    DEFAULT_IMAGE_NAME, IMAGE_EXTENSION, ImageStore, PutImageResult, compute_hash,
};
