pub mod external;
pub mod null;

use crate::utils::graph::Point;
use anyhow::Result;
use async_trait::async_trait;
use jamwatch_media::Image;

/// Outline of one detected vehicle in image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segment {
    pub points: Vec<Point<f32>>,
}

impl Segment {
    pub fn new(points: Vec<Point<f32>>) -> Self {
        Segment { points }
    }

    /// Integer outline as consumed by the geometry engine.
    pub fn to_integer(&self) -> Vec<Point<i32>> {
        self.points.iter().map(|point| point.truncate()).collect()
    }
}

impl From<Vec<[f32; 2]>> for Segment {
    fn from(points: Vec<[f32; 2]>) -> Self {
        Segment {
            points: points.into_iter().map(|[x, y]| Point::new(x, y)).collect(),
        }
    }
}

/// Vehicle segmentation model.
///
/// One instance is shared by every pipeline run for the life of the process,
/// so implementations must be reusable across calls without reinitialising.
/// An empty result means nothing was detected and is not an error.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, image: &Image) -> Result<Vec<Segment>>;

    fn name(&self) -> &str;
}
