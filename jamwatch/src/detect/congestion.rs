use jamwatch_inference::utils::geometry::{intersection_area_with_mask, polygon_area};
use jamwatch_inference::utils::masks::PolygonMask;
use jamwatch_inference::{ImageSize, Point};
use log::warn;
use rayon::prelude::*;

/// Share of the ROI covered by detected segments, in percent.
///
/// Every segment is intersected with the ROI on its own and the pixel counts
/// are summed, so overlapping detections are counted twice. The result is
/// capped at 100. A ROI without area yields 0, which callers must not read as
/// "nothing detected".
pub fn calculate_congestion(
    segments: &[Vec<Point<i32>>],
    roi: &[Point<i32>],
    image_size: ImageSize,
) -> f64 {
    let roi_area = polygon_area(roi);
    if roi_area <= 0.0 {
        warn!(
            "Degenerate ROI {:?}: zero area, reporting 0% for {} segments",
            roi,
            segments.len()
        );
        return 0.0;
    }
    if segments.is_empty() {
        return 0.0;
    }

    let roi_mask = PolygonMask::rasterize(roi, image_size);
    // Pixel counts are whole numbers, the parallel sum is exact.
    let total_area: f64 = segments
        .par_iter()
        .map(|segment| intersection_area_with_mask(segment, &roi_mask))
        .sum();

    (100.0 * total_area / roi_area).min(100.0)
}
