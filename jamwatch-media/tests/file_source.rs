use jamwatch_media::source::{FileImageSource, ImageSource};
use jamwatch_media::{Image, ImageFormat};

#[tokio::test]
async fn reads_camera_frames_from_directory() -> anyhow::Result<()> {
    let root = std::env::temp_dir().join(format!("jamwatch-media-{}", std::process::id()));
    std::fs::create_dir_all(&root)?;
    Image::from_frame(image::RgbImage::new(8, 6)).save_with_format(root.join("cam-a.png"), ImageFormat::Png)?;

    let source = FileImageSource::new(&root);
    let bytes = source.fetch("cam-a").await?;
    assert_eq!(Image::from_bytes(bytes)?.get_size(), (8, 6));

    assert!(source.fetch("cam-b").await.is_err());
    assert!(source.fetch("../cam-a").await.is_err());

    std::fs::remove_dir_all(&root)?;
    Ok(())
}
