//! HTTP client for the VisionPulse upload / inference / validation API
//!
//! The session cache treats this API as an external collaborator: all
//! the cache needs from it is the resulting [`visionpulse_core::CachedImage`]
//! shape and updated box sets. Transport concerns stay in this crate.

mod client;
mod data_url;
mod wire;

pub use client::{ApiClient, ClientError, ClientResult};
pub use data_url::{base64_payload, to_data_url};
pub use wire::{
    BoxValidation, InferenceResponse, UploadResponse, ValidationRequest, ValidationResponse,
};
