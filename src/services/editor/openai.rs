//! OpenAI-compatible image edit client.
//!
//! Talks to `POST {api_base}/images/edits` with a multipart body carrying
//! the model, the prompt, and the stored upload.

use super::{EditorError, ImageEditor, ImageFormat};
use crate::config::EditorConfig;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::path::Path;

pub struct OpenAiImageEditor {
    client: reqwest::Client,
    config: EditorConfig,
}

#[derive(Debug, Deserialize)]
struct ImagesEditResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

impl OpenAiImageEditor {
    pub fn new(config: EditorConfig) -> Self {
        // No request timeout: an edit call blocks until the upstream
        // answers or the connection drops.
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Whether an API key is present. An unconfigured editor still
    /// constructs; calls fail with `EditorError::NotConfigured`.
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }

    fn edits_url(&self) -> String {
        format!("{}/images/edits", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl ImageEditor for OpenAiImageEditor {
    async fn edit_image(&self, image_path: &Path, prompt: &str) -> Result<Vec<u8>, EditorError> {
        if !self.is_configured() {
            return Err(EditorError::NotConfigured(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }

        let image_bytes = tokio::fs::read(image_path).await?;
        let format = ImageFormat::from_magic_bytes(&image_bytes).unwrap_or(ImageFormat::Png);

        let image_part = reqwest::multipart::Part::bytes(image_bytes)
            .file_name(format!("image.{}", format.extension()))
            .mime_str(format.mime_type())
            .map_err(|e| EditorError::InvalidRequest(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("prompt", prompt.to_string())
            .part("image", image_part);

        tracing::debug!(
            model = %self.config.model,
            prompt_length = prompt.len(),
            "Sending image edit request"
        );

        let response = self
            .client
            .post(self.edits_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| EditorError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EditorError::ApiError(format!(
                "image edit request failed with status {}: {}",
                status, body
            )));
        }

        let edit_response: ImagesEditResponse = response
            .json()
            .await
            .map_err(|e| EditorError::UnexpectedResponse(e.to_string()))?;

        let image_data = edit_response.data.into_iter().next().ok_or_else(|| {
            EditorError::UnexpectedResponse("no images in edit response".to_string())
        })?;

        let b64 = image_data.b64_json.ok_or_else(|| {
            EditorError::UnexpectedResponse("edit response contained no image data".to_string())
        })?;

        general_purpose::STANDARD
            .decode(&b64)
            .map_err(|e| EditorError::DecodeError(e.to_string()))
    }
}
