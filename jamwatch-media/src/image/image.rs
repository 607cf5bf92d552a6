use ::image::{ImageFormat, RgbImage};
use bytes::Bytes;

/// A decoded camera frame.
///
/// The frame is always held as packed RGB8. When the image came from encoded
/// bytes, the original payload and its detected format are kept alongside so
/// collaborators that need the compressed form (remote detectors) do not have
/// to re-encode it.
#[derive(Debug, Clone)]
pub struct Image {
    pub(crate) frame: RgbImage,
    pub(crate) encoded: Option<Bytes>,
    pub(crate) format: Option<ImageFormat>,
}

impl Image {
    pub fn from_frame(frame: RgbImage) -> Self {
        Image {
            frame,
            encoded: None,
            format: None,
        }
    }

    pub fn frame(&self) -> &RgbImage {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut RgbImage {
        // Pixels are about to change, the cached payload no longer matches.
        self.encoded = None;
        &mut self.frame
    }

    pub fn raw_data(&self) -> &[u8] {
        self.frame.as_raw()
    }

    pub fn encoded(&self) -> Option<&Bytes> {
        self.encoded.as_ref()
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }
}
