use crate::source::{ImageSource, CAMERA_ID_PLACEHOLDER};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use std::time::Duration;

/// Fetches snapshots over HTTP from a URL template such as
/// `http://cams.local/snapshot/{camera_id}.jpg`.
pub struct HttpImageSource {
    http_client: reqwest::Client,
    url_template: String,
}

impl HttpImageSource {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url_template = url_template.into();
        if !url_template.contains(CAMERA_ID_PLACEHOLDER) {
            bail!(
                "Image URL template `{}` has no {} placeholder",
                url_template,
                CAMERA_ID_PLACEHOLDER
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            url_template,
        })
    }

    pub fn url_for(&self, camera_id: &str) -> String {
        self.url_template.replace(CAMERA_ID_PLACEHOLDER, camera_id)
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, camera_id: &str) -> Result<Bytes> {
        let url = self.url_for(camera_id);
        debug!("Fetching camera {} from {}", camera_id, url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Image server rejected {}", url))?;

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body from {}", url))?;
        if bytes.is_empty() {
            bail!("Empty image body from {}", url);
        }

        Ok(bytes)
    }
}

#[test]
fn template_requires_placeholder() {
    assert!(HttpImageSource::new("http://cams.local/latest.jpg", Duration::from_secs(5)).is_err());

    let source =
        HttpImageSource::new("http://cams.local/{camera_id}.jpg", Duration::from_secs(5)).unwrap();
    assert_eq!(source.url_for("north-7"), "http://cams.local/north-7.jpg");
}
