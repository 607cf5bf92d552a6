use crate::inference::{Detector, Segment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use jamwatch_media::{Image, ImageFormat};
use log::debug;
use serde::Deserialize;
use std::time::Duration;

/// Segmentation served by a remote model.
///
/// The frame is POSTed as an encoded image body; the server answers with
/// `{"segments": [[[x, y], ...], ...]}` in pixel coordinates of that frame.
pub struct ExternalDetector {
    http_client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct SegmentationResponse {
    #[serde(default)]
    pub segments: Vec<Vec<[f32; 2]>>,
}

impl SegmentationResponse {
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
            .into_iter()
            .map(Segment::from)
            .filter(|segment| segment.points.len() >= 3)
            .collect()
    }
}

impl ExternalDetector {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Detector for ExternalDetector {
    async fn detect(&self, image: &Image) -> Result<Vec<Segment>> {
        let body = image.encode(ImageFormat::Jpeg)?;
        debug!("Sending {} bytes to {}", body.len(), self.endpoint);

        let response: SegmentationResponse = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(body)
            .send()
            .await
            .with_context(|| format!("Segmentation request to {} failed", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("Segmentation server {} returned an error", self.endpoint))?
            .json()
            .await
            .context("Malformed segmentation response")?;

        Ok(response.into_segments())
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

#[test]
fn parses_segments_and_drops_degenerate_ones() {
    let response: SegmentationResponse = serde_json::from_str(
        r#"{"segments": [[[1.5, 2.0], [10.9, 2.0], [10.0, 8.2]], [[0, 0], [1, 1]]]}"#,
    )
    .unwrap();
    let segments = response.into_segments();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].to_integer()[1], crate::Point::new(10, 2));

    let empty: SegmentationResponse = serde_json::from_str("{}").unwrap();
    assert!(empty.into_segments().is_empty());
}
