//! Core domain types
//!
//! Defines the entities owned by the review session:
//! - BoundingBox: one detection with its ground-truth review state
//! - CachedImage: one processed image in the session history

mod bbox;
mod image;

pub use bbox::BoundingBox;
pub use image::CachedImage;
