use crate::Image;
use ::image::ImageFormat;
use anyhow::{Context, Result};
use bytes::Bytes;
use std::io::Cursor;
use std::path::Path;

impl Image {
    /// Saves the frame, picking the encoder from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)
            .with_context(|| format!("Cannot infer image format for {}", path.display()))?;

        self.save_with_format(path, format)
    }

    /// Saves through a hidden sibling file and renames it over `path`, so
    /// readers of `path` only ever see a complete image.
    pub fn save_replacing(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("Invalid image path {}", path.display()))?;
        let partial = path.with_file_name(format!(".partial.{}", file_name));

        self.save(&partial)?;
        std::fs::rename(&partial, path).with_context(|| {
            format!("Failed to move {} to {}", partial.display(), path.display())
        })?;

        Ok(())
    }

    pub fn save_with_format(&self, path: impl AsRef<Path>, format: ImageFormat) -> Result<()> {
        let path = path.as_ref();
        self.frame
            .save_with_format(path, format)
            .with_context(|| format!("Failed to save image to {}", path.display()))?;

        Ok(())
    }

    /// Returns the encoded payload, re-encoding as `format` when the frame
    /// has no cached payload in that format.
    pub fn encode(&self, format: ImageFormat) -> Result<Bytes> {
        if let (Some(encoded), Some(current)) = (&self.encoded, self.format) {
            if current == format {
                return Ok(encoded.clone());
            }
        }

        let mut buffer = Vec::new();
        self.frame
            .write_to(&mut Cursor::new(&mut buffer), format)
            .with_context(|| format!("Failed to encode image as {:?}", format))?;

        Ok(Bytes::from(buffer))
    }
}

#[test]
fn encode_then_decode_keeps_size() -> Result<()> {
    let image = Image::from_frame(::image::RgbImage::new(16, 9));
    let bytes = image.encode(ImageFormat::Png)?;
    let decoded = Image::from_bytes(bytes)?;

    assert_eq!(decoded.get_size(), (16, 9));
    Ok(())
}

#[test]
fn save_replacing_overwrites_without_leftovers() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("jamwatch-save-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("cam.jpg");

    Image::from_frame(::image::RgbImage::new(8, 8)).save_replacing(&path)?;
    Image::from_frame(::image::RgbImage::new(12, 6)).save_replacing(&path)?;

    let saved = Image::from_bytes(std::fs::read(&path)?)?;
    assert_eq!(saved.get_size(), (12, 6));
    assert_eq!(saved.format(), Some(ImageFormat::Jpeg));
    assert_eq!(std::fs::read_dir(&dir)?.count(), 1);
    std::fs::remove_dir_all(dir).ok();
    Ok(())
}
