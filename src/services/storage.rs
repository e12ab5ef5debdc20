use crate::error::AppError;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A file written by the store. `name` is the generated filename, `path`
/// the full on-disk location.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub name: String,
    pub path: PathBuf,
}

/// Flat-file store for uploaded and edited images. Files are never
/// deleted; both directories accumulate over time.
#[derive(Clone)]
pub struct ImageStore {
    upload_dir: PathBuf,
    edited_dir: PathBuf,
}

impl ImageStore {
    pub async fn new(
        upload_dir: impl Into<PathBuf>,
        edited_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let upload_dir = upload_dir.into();
        let edited_dir = edited_dir.into();
        fs::create_dir_all(&upload_dir).await?;
        fs::create_dir_all(&edited_dir).await?;
        Ok(Self {
            upload_dir,
            edited_dir,
        })
    }

    pub fn edited_dir(&self) -> &Path {
        &self.edited_dir
    }

    /// Persists an uploaded image, keeping the caller-supplied extension.
    pub async fn save_upload(&self, data: &[u8], extension: &str) -> Result<StoredImage, AppError> {
        self.save(&self.upload_dir, "upload", extension, data).await
    }

    /// Persists an edited result. The upstream API returns PNG.
    pub async fn save_edited(&self, data: &[u8]) -> Result<StoredImage, AppError> {
        self.save(&self.edited_dir, "edited", "png", data).await
    }

    async fn save(
        &self,
        dir: &Path,
        prefix: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredImage, AppError> {
        let name = format!("{}_{}.{}", prefix, random_token(), extension);
        let path = dir.join(&name);
        fs::write(&path, data).await?;
        Ok(StoredImage { name, path })
    }
}

/// 16-character hex token. Random names keep concurrent writes from
/// colliding without any coordination.
fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let token_bytes: [u8; 8] = rng.gen();
    hex::encode(token_bytes)
}
