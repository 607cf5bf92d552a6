use crate::inference::{Detector, Segment};
use anyhow::Result;
use async_trait::async_trait;
use jamwatch_media::Image;

/// Detector that never sees anything. Useful for dry runs of the service.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDetector;

#[async_trait]
impl Detector for NullDetector {
    async fn detect(&self, _image: &Image) -> Result<Vec<Segment>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "null"
    }
}
