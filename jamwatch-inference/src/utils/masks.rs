use crate::utils::graph::{ImageSize, Point};
use anyhow::{bail, Result};
use bitvec::prelude::*;
use jamwatch_media::{Image, RGB};
use rayon::prelude::*;

/// Row-major boolean mask of a rasterized polygon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonMask {
    bits: BitVec,
    size: ImageSize,
}

impl PolygonMask {
    pub fn empty(size: ImageSize) -> Self {
        PolygonMask {
            bits: bitvec![usize, Lsb0; 0; size.pixel_count()],
            size,
        }
    }

    /// Sets every pixel whose centre lies inside the outline (even-odd rule).
    ///
    /// Outlines may extend past the raster; only in-raster pixels are set.
    pub fn rasterize(points: &[Point<i32>], size: ImageSize) -> Self {
        let mut mask = PolygonMask::empty(size);
        if points.len() < 3 || size.width == 0 || size.height == 0 {
            return mask;
        }

        let min_y = points.iter().map(|p| p.y).min().unwrap_or(0).max(0);
        let max_y = points
            .iter()
            .map(|p| p.y)
            .max()
            .unwrap_or(0)
            .min(size.height as i32);

        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
        for row in min_y..max_y {
            let center_y = row as f64 + 0.5;

            crossings.clear();
            for (index, start) in points.iter().enumerate() {
                let end = &points[(index + 1) % points.len()];
                let (x0, y0) = (start.x as f64, start.y as f64);
                let (x1, y1) = (end.x as f64, end.y as f64);
                // Half-open test so a vertex shared by two edges counts once.
                if (y0 > center_y) != (y1 > center_y) {
                    crossings.push(x0 + (center_y - y0) * (x1 - x0) / (y1 - y0));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            let row_start = row as usize * size.width as usize;
            for span in crossings.chunks_exact(2) {
                // Pixel x is inside when x + 0.5 falls in [span[0], span[1]).
                let first = ((span[0] - 0.5).ceil().max(0.0) as i64).min(size.width as i64);
                let last = ((span[1] - 0.5).ceil().max(0.0) as i64).min(size.width as i64);
                if first < last {
                    mask.bits[row_start + first as usize..row_start + last as usize].fill(true);
                }
            }
        }

        mask
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn intersect(&self, other: &PolygonMask) -> PolygonMask {
        debug_assert_eq!(self.size, other.size);
        let mut bits = self.bits.clone();
        bits &= other.bits.as_bitslice();
        PolygonMask {
            bits,
            size: self.size,
        }
    }

    pub fn intersection_count(&self, other: &PolygonMask) -> usize {
        self.intersect(other).count_ones()
    }
}

pub trait ApplyMask {
    fn layering_mask(&mut self, mask: &BitVec, apply_color: RGB) -> Result<()>;
}

impl ApplyMask for Image {
    /// Adds `apply_color` (saturating) to every pixel set in `mask`.
    fn layering_mask(&mut self, mask: &BitVec, apply_color: RGB) -> Result<()> {
        let (width, height) = self.get_size();
        if mask.len() != width as usize * height as usize {
            bail!(
                "Mask of {} pixels does not match a {}x{} frame",
                mask.len(),
                width,
                height
            );
        }

        self.frame_mut()
            .par_chunks_mut(3)
            .enumerate()
            .filter(|(index, _)| mask[*index])
            .for_each(|(_, pixel)| {
                pixel[0] = pixel[0].saturating_add(apply_color.0);
                pixel[1] = pixel[1].saturating_add(apply_color.1);
                pixel[2] = pixel[2].saturating_add(apply_color.2);
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn rectangle_fills_exact_pixels() {
        let mask = PolygonMask::rasterize(&rect(2, 3, 6, 5), ImageSize::new(10, 10));

        assert_eq!(mask.count_ones(), 8);
        assert!(mask.bits()[3 * 10 + 2]);
        assert!(mask.bits()[4 * 10 + 5]);
        assert!(!mask.bits()[5 * 10 + 2]);
        assert!(!mask.bits()[3 * 10 + 6]);
    }

    #[test]
    fn triangle_uses_pixel_centres() {
        // Legs of 4: only pixels with x + y < 3 have their centre inside.
        let triangle = [Point::new(0, 0), Point::new(4, 0), Point::new(0, 4)];
        let mask = PolygonMask::rasterize(&triangle, ImageSize::new(8, 8));

        assert_eq!(mask.count_ones(), 3 + 2 + 1);
        assert!(mask.bits()[2]);
        assert!(!mask.bits()[3]);
    }

    #[test]
    fn too_few_points_is_empty() {
        let mask = PolygonMask::rasterize(&[Point::new(1, 1), Point::new(5, 5)], ImageSize::new(8, 8));
        assert_eq!(mask.count_ones(), 0);
    }

    #[test]
    fn layering_adds_colour_under_mask() -> Result<()> {
        let size = ImageSize::new(4, 4);
        let mut image = Image::from_frame(jamwatch_media::RgbImage::new(4, 4));
        let mask = PolygonMask::rasterize(&rect(0, 0, 2, 4), size);

        image.layering_mask(mask.bits(), RGB(0, 0, 200))?;
        image.layering_mask(mask.bits(), RGB(0, 0, 200))?;

        assert_eq!(image.frame().get_pixel(1, 3).0, [0, 0, 255]);
        assert_eq!(image.frame().get_pixel(2, 3).0, [0, 0, 0]);
        Ok(())
    }

    #[test]
    fn layering_rejects_mismatched_mask() {
        let mut image = Image::from_frame(jamwatch_media::RgbImage::new(3, 3));
        let mask = bitvec![usize, Lsb0; 1; 4];
        assert!(image.layering_mask(&mask, RGB(1, 1, 1)).is_err());
    }
}
