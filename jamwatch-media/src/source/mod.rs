pub mod file_source;
pub mod http_source;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

pub use file_source::FileImageSource;
pub use http_source::HttpImageSource;

/// Where the current frame of a camera comes from.
///
/// Implementations return the still-encoded payload; decoding happens on the
/// caller's blocking pool. Timeouts are the source's own business.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, camera_id: &str) -> Result<Bytes>;
}

pub type SharedImageSource = Arc<dyn ImageSource>;

/// Placeholder substituted with the camera identifier in URL templates.
pub const CAMERA_ID_PLACEHOLDER: &str = "{camera_id}";
