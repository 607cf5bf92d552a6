use crate::detect::congestion::calculate_congestion;
use crate::detect::render::render_congestion;
use crate::detect::result::CongestionResult;
use crate::roi::RoiTable;
use jamwatch_inference::engine::SharedDetector;
use jamwatch_inference::{ImageSize, Point};
use jamwatch_media::source::SharedImageSource;
use jamwatch_media::{FontVec, Image};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::spawn_blocking;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no ROI configured for camera {0}")]
    RoiNotFound(String),
    #[error("image for camera {camera_id} unavailable: {source:#}")]
    ImageUnavailable {
        camera_id: String,
        source: anyhow::Error,
    },
    #[error("detection failed for camera {camera_id}: {source:#}")]
    Detection {
        camera_id: String,
        source: anyhow::Error,
    },
    #[error("congestion estimation failed for camera {camera_id}: {source:#}")]
    Estimation {
        camera_id: String,
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn camera_id(&self) -> &str {
        match self {
            PipelineError::RoiNotFound(camera_id)
            | PipelineError::ImageUnavailable { camera_id, .. }
            | PipelineError::Detection { camera_id, .. }
            | PipelineError::Estimation { camera_id, .. } => camera_id,
        }
    }
}

/// Frame → detections → congestion for one camera at a time.
///
/// Holds only shared handles; any number of runs may be in flight, each
/// reusing the same detector instance.
#[derive(Clone)]
pub struct CameraPipeline {
    detector: SharedDetector,
    source: SharedImageSource,
    image_size: ImageSize,
    result_dir: PathBuf,
    label_font: Option<Arc<FontVec>>,
}

impl CameraPipeline {
    pub fn new(
        detector: SharedDetector,
        source: SharedImageSource,
        image_size: ImageSize,
        result_dir: impl Into<PathBuf>,
    ) -> Self {
        CameraPipeline {
            detector,
            source,
            image_size,
            result_dir: result_dir.into(),
            label_font: None,
        }
    }

    /// Writes the congestion figure onto rendered frames.
    pub fn with_label_font(mut self, font: FontVec) -> Self {
        self.label_font = Some(Arc::new(font));
        self
    }

    pub fn artifact_path(&self, camera_id: &str) -> PathBuf {
        self.result_dir.join(format!("{}.jpg", camera_id))
    }

    pub async fn process_camera(
        &self,
        camera_id: &str,
        table: &RoiTable,
    ) -> Result<CongestionResult, PipelineError> {
        let roi = *table
            .get(camera_id)
            .ok_or_else(|| PipelineError::RoiNotFound(camera_id.to_string()))?;

        let image_unavailable = |source: anyhow::Error| PipelineError::ImageUnavailable {
            camera_id: camera_id.to_string(),
            source,
        };
        let payload = self
            .source
            .fetch(camera_id)
            .await
            .map_err(image_unavailable)?;

        // Detection runs on the frame as captured: ROI and detections share
        // its pixel coordinates, the raster only clips them.
        let image = spawn_blocking(move || Image::from_bytes(payload))
            .await
            .map_err(anyhow::Error::from)
            .and_then(|image| image)
            .map_err(image_unavailable)?;

        let segments = self
            .detector
            .detect(&image)
            .await
            .map_err(|source| PipelineError::Detection {
                camera_id: camera_id.to_string(),
                source,
            })?;
        debug!("Camera {}: {} segments detected", camera_id, segments.len());

        let outlines: Vec<Vec<Point<i32>>> =
            segments.iter().map(|segment| segment.to_integer()).collect();
        let size = self.image_size;
        let artifact = self.artifact_path(camera_id);
        let font = self.label_font.clone();
        let camera = camera_id.to_string();
        let congestion_percentage = spawn_blocking(move || {
            let percentage = calculate_congestion(&outlines, roi.points(), size);

            let rendered = render_congestion(image, &roi, &outlines, percentage, font.as_deref())
                .and_then(|frame| frame.save_replacing(&artifact));
            if let Err(err) = rendered {
                warn!("Camera {}: failed to render result: {:#}", camera, err);
            }

            percentage
        })
        .await
        .map_err(|err| PipelineError::Estimation {
            camera_id: camera_id.to_string(),
            source: err.into(),
        })?;

        info!(
            "Camera {}: congestion {:.2}%",
            camera_id, congestion_percentage
        );
        Ok(CongestionResult::new(camera_id, congestion_percentage))
    }
}
