//! Mock editor implementation for testing.

use super::{EditorError, ImageEditor};
use async_trait::async_trait;
use std::path::Path;

/// Editor double returning a canned result. Still reads the stored upload
/// so callers exercise the same file contract as the real client.
pub struct MockImageEditor {
    outcome: Result<Vec<u8>, String>,
}

impl MockImageEditor {
    /// An editor whose every call succeeds with the given bytes.
    pub fn succeeding(edited_bytes: Vec<u8>) -> Self {
        Self {
            outcome: Ok(edited_bytes),
        }
    }

    /// An editor whose every call fails with an API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

#[async_trait]
impl ImageEditor for MockImageEditor {
    async fn edit_image(&self, image_path: &Path, _prompt: &str) -> Result<Vec<u8>, EditorError> {
        tokio::fs::read(image_path).await?;

        match &self.outcome {
            Ok(bytes) => Ok(bytes.clone()),
            Err(message) => Err(EditorError::ApiError(message.clone())),
        }
    }
}
