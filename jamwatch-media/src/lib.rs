pub mod image;
pub mod source;

pub use crate::image::image::Image;
pub use ::image::{ImageFormat, Rgb, RgbImage};
pub use ab_glyph::FontVec;

/// Colour used for masks, outlines and labels drawn over a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RGB(pub u8, pub u8, pub u8);
