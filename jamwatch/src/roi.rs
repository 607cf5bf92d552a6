use anyhow::{bail, Context, Result};
use jamwatch_inference::utils::geometry::polygon_area;
use jamwatch_inference::Point;
use log::{info, warn};
use serde::Deserialize;
use std::path::Path;

/// Operator-defined quadrilateral marking the measured stretch of road.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi([Point<i32>; 4]);

impl Roi {
    pub fn new(points: [Point<i32>; 4]) -> Self {
        Roi(points)
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.0
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.0)
    }
}

#[derive(Debug, Deserialize)]
struct RoiRecord {
    #[serde(rename = "camID", alias = "camera_id")]
    camera_id: String,
    roi: Vec<[i32; 2]>,
}

/// Camera identifier → ROI, in file order. Loaded once, never mutated.
#[derive(Debug, Clone, Default)]
pub struct RoiTable {
    entries: Vec<(String, Roi)>,
}

impl RoiTable {
    /// A missing file is an empty table; anything malformed is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("ROI table {} not found, no cameras will be processed", path.display());
            return Ok(RoiTable::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ROI table {}", path.display()))?;
        let table = Self::from_json(&content)
            .with_context(|| format!("Invalid ROI table {}", path.display()))?;
        info!("Loaded {} camera ROIs from {}", table.len(), path.display());

        Ok(table)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let records: Vec<RoiRecord> = serde_json::from_str(content)?;
        let mut entries: Vec<(String, Roi)> = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let points: [Point<i32>; 4] = match <[[i32; 2]; 4]>::try_from(record.roi.as_slice()) {
                Ok(points) => points.map(|[x, y]| Point::new(x, y)),
                Err(_) => bail!(
                    "record {} (camera {}) has {} ROI points, expected 4",
                    index,
                    record.camera_id,
                    record.roi.len()
                ),
            };

            if entries.iter().any(|(id, _)| *id == record.camera_id) {
                warn!("Duplicate ROI for camera {}, keeping the first one", record.camera_id);
                continue;
            }

            let roi = Roi::new(points);
            if roi.area() == 0.0 {
                warn!("ROI for camera {} encloses no area", record.camera_id);
            }
            entries.push((record.camera_id, roi));
        }

        Ok(RoiTable { entries })
    }

    pub fn get(&self, camera_id: &str) -> Option<&Roi> {
        self.entries
            .iter()
            .find(|(id, _)| id == camera_id)
            .map(|(_, roi)| roi)
    }

    pub fn camera_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Roi)> for RoiTable {
    fn from_iter<I: IntoIterator<Item = (String, Roi)>>(iter: I) -> Self {
        RoiTable {
            entries: iter.into_iter().collect(),
        }
    }
}
