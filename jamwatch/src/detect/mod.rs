pub mod congestion;
pub mod render;
pub mod result;

use jamwatch_media::RGB;

pub(crate) const SEGMENT_FILL: RGB = RGB(0, 0, 255);
pub(crate) const ROI_OUTLINE: RGB = RGB(0, 255, 0);
pub(crate) const LABEL_COLOR: RGB = RGB(255, 0, 0);
pub(crate) const OUTLINE_THICKNESS: u32 = 2;
/// Weight of the drawn overlay against the camera frame.
pub(crate) const OVERLAY_ALPHA: f32 = 0.5;
pub(crate) const LABEL_ORIGIN: (i32, i32) = (50, 30);
pub(crate) const LABEL_HEIGHT: f32 = 32.0;
