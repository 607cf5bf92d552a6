use crate::utils::graph::{ImageSize, Point};
use crate::utils::masks::PolygonMask;
use num::{Num, ToPrimitive};

/// Shoelace area of a polygon given by its boundary in order.
///
/// Fewer than three vertices have zero area. Self-intersecting outlines get
/// the plain shoelace value, lobes of opposite orientation cancel out.
pub fn polygon_area<T>(points: &[Point<T>]) -> f64
where
    T: Num + ToPrimitive + Copy,
{
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(current, next)| {
            let (x0, y0) = current.to_f64();
            let (x1, y1) = next.to_f64();
            x0 * y1 - x1 * y0
        })
        .sum();

    (twice_area / 2.0).abs()
}

/// Overlap between `segment` and `roi` in whole pixels of `size`.
///
/// Both outlines are rasterized with the pixel-centre rule and the masks are
/// intersected, so the result is an approximation bounded by
/// `size.width * size.height`.
pub fn intersection_area(segment: &[Point<i32>], roi: &[Point<i32>], size: ImageSize) -> f64 {
    let roi_mask = PolygonMask::rasterize(roi, size);
    intersection_area_with_mask(segment, &roi_mask)
}

/// Same as [`intersection_area`] against an already rasterized ROI.
pub fn intersection_area_with_mask(segment: &[Point<i32>], roi_mask: &PolygonMask) -> f64 {
    let segment_mask = PolygonMask::rasterize(segment, roi_mask.size());
    segment_mask.intersection_count(roi_mask) as f64
}
