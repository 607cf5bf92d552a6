use crate::{Image, RGB};
use ::image::Rgb;
use ab_glyph::{FontVec, PxScale};
use anyhow::{anyhow, Context, Result};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use std::path::Path;

/// Loads a TrueType/OpenType font for frame labels.
pub fn load_font(path: impl AsRef<Path>) -> Result<FontVec> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read font {}", path.display()))?;

    FontVec::try_from_vec(data).map_err(|err| anyhow!("Invalid font {}: {}", path.display(), err))
}

pub trait DrawLabel {
    /// Writes `text` with its top-left corner at `origin`.
    fn draw_label(&mut self, text: &str, origin: (i32, i32), height: f32, color: RGB, font: &FontVec);
}

impl DrawLabel for Image {
    fn draw_label(&mut self, text: &str, origin: (i32, i32), height: f32, color: RGB, font: &FontVec) {
        let color = Rgb([color.0, color.1, color.2]);
        draw_text_mut(
            self.frame_mut(),
            color,
            origin.0,
            origin.1,
            PxScale::from(height),
            font,
            text,
        );
    }
}

pub trait DrawOutline {
    /// Draws a closed polyline through `points` (pixel coordinates).
    fn draw_outline(&mut self, points: &[(f32, f32)], color: RGB, thickness: u32);
}

impl DrawOutline for Image {
    fn draw_outline(&mut self, points: &[(f32, f32)], color: RGB, thickness: u32) {
        if points.len() < 2 {
            return;
        }

        let color = Rgb([color.0, color.1, color.2]);
        let frame = self.frame_mut();
        let half = thickness.max(1) as f32 / 2.0;

        for (index, &start) in points.iter().enumerate() {
            let end = points[(index + 1) % points.len()];
            // Thick lines are drawn as parallel one-pixel strokes.
            let mut offset = -half + 0.5;
            while offset < half {
                draw_line_segment_mut(
                    frame,
                    (start.0 + offset, start.1 + offset),
                    (end.0 + offset, end.1 + offset),
                    color,
                );
                offset += 1.0;
            }
        }
    }
}

#[test]
fn outline_touches_vertices() {
    let mut image = Image::from_frame(::image::RgbImage::new(20, 20));
    image.draw_outline(&[(2.0, 2.0), (17.0, 2.0), (17.0, 17.0)], RGB(0, 255, 0), 1);

    assert_eq!(image.frame().get_pixel(2, 2), &Rgb([0, 255, 0]));
    assert_eq!(image.frame().get_pixel(10, 2), &Rgb([0, 255, 0]));
    assert_eq!(image.frame().get_pixel(10, 15), &Rgb([0, 0, 0]));
}

#[test]
fn garbage_font_is_rejected() {
    let path = std::env::temp_dir().join(format!("jamwatch-font-{}.ttf", std::process::id()));
    std::fs::write(&path, b"not a font").unwrap();

    assert!(load_font(&path).is_err());
    assert!(load_font(path.with_extension("missing")).is_err());
    std::fs::remove_file(path).ok();
}
