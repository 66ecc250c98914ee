//! Thin typed client over the backend endpoints

use crate::data_url;
use crate::wire::{InferenceResponse, UploadResponse, ValidationRequest, ValidationResponse};
use reqwest::multipart;
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use visionpulse_core::{CachedImage, InferenceMetrics};

/// Client operation errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected payload: {0}")]
    Payload(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client for the VisionPulse inference backend.
///
/// The methods mirror the backend routes one-to-one;
/// [`ApiClient::process_image`] composes upload + inference into the
/// ready-to-cache shape the session coordinator records.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Upload an image file. Pass an existing `session_id` to keep
    /// appending to the same backend session.
    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        session_id: Option<&str>,
    ) -> ClientResult<UploadResponse> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);

        let mut request = self.http.post(self.url("/upload")).multipart(form);
        if let Some(id) = session_id {
            request = request.query(&[("session_id", id)]);
        }

        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Run detection on an uploaded image. The image travels as base64
    /// in the body, so the call works against stateless backend
    /// instances.
    pub async fn infer(
        &self,
        session_id: &str,
        image_id: &str,
        image_base64: &str,
    ) -> ClientResult<InferenceResponse> {
        let response = self
            .http
            .post(self.url(&format!("/infer/{session_id}")))
            .query(&[("image_id", image_id)])
            .json(&json!({ "image_data": image_base64 }))
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Submit reviewed boxes; returns the server's true metrics.
    pub async fn validate(
        &self,
        session_id: &str,
        request: &ValidationRequest,
    ) -> ClientResult<ValidationResponse> {
        let response = self
            .http
            .post(self.url(&format!("/validate/{session_id}")))
            .json(request)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Upload + infer in one step. Returns the backend session id, the
    /// ready-to-cache image, and the detector metrics for display.
    pub async fn process_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        session_id: Option<&str>,
    ) -> ClientResult<(String, CachedImage, InferenceMetrics)> {
        let image_src = data_url::to_data_url(filename, &bytes);
        let uploaded = self.upload(filename, bytes, session_id).await?;

        let payload = data_url::base64_payload(&image_src)
            .ok_or_else(|| ClientError::Payload("image payload is not a data URL".to_string()))?;
        let inferred = self
            .infer(&uploaded.session_id, &uploaded.image_id, payload)
            .await?;
        debug!(
            boxes = inferred.boxes.len(),
            "inference complete for {}", uploaded.image_id
        );

        let image = CachedImage::new(
            uploaded.image_id,
            image_src,
            uploaded.filename,
            inferred.boxes,
        );
        Ok((uploaded.session_id, image, inferred.metrics))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_else(|_| String::new());
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8000///");
        assert_eq!(client.url("/upload"), "http://localhost:8000/upload");
    }
}
