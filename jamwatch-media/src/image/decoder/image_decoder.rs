use crate::Image;
use anyhow::{bail, Context, Result};
use bytes::Bytes;
use log::debug;

impl Image {
    pub fn from_bytes(buffer: impl Into<Bytes>) -> Result<Self> {
        let buffer = buffer.into();
        if buffer.is_empty() {
            bail!("Image payload is empty");
        }

        let format = ::image::guess_format(&buffer).context("Unrecognised image format")?;
        let frame = ::image::load_from_memory_with_format(&buffer, format)
            .with_context(|| format!("Failed to decode {:?} image", format))?
            .into_rgb8();
        debug!(
            "Decoded {:?} image of {}x{}",
            format,
            frame.width(),
            frame.height()
        );

        Ok(Image {
            frame,
            encoded: Some(buffer),
            format: Some(format),
        })
    }
}
