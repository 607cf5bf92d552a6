use crate::source::ImageSource;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Reads `{camera_id}.{jpg,jpeg,png}` from a directory, first match wins.
pub struct FileImageSource {
    root: PathBuf,
}

impl FileImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn fetch(&self, camera_id: &str) -> Result<Bytes> {
        // Identifiers come from configuration but still must not escape the root.
        if camera_id.contains(['/', '\\']) || camera_id.contains("..") {
            bail!("Invalid camera identifier `{}`", camera_id);
        }

        for extension in EXTENSIONS {
            let path = self.root.join(format!("{}.{}", camera_id, extension));
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                let buffer = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                return Ok(Bytes::from(buffer));
            }
        }

        bail!(
            "No image for camera {} under {}",
            camera_id,
            self.root.display()
        )
    }
}
