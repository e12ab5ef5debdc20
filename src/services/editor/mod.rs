//! Image editor abstraction and implementations.
//!
//! The HTTP layer only sees the `ImageEditor` trait, so the OpenAI-backed
//! implementation can be swapped for a double in tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Error type for editor operations.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Editor not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Applies a text instruction to a stored image and returns the edited
/// bytes. Implementations read the upload from disk themselves.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn edit_image(&self, image_path: &Path, prompt: &str) -> Result<Vec<u8>, EditorError>;
}

/// Image formats the service recognizes when labeling an upload for the
/// upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Detects the format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}
