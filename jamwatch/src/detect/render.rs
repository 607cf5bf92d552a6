use crate::detect::{
    LABEL_COLOR, LABEL_HEIGHT, LABEL_ORIGIN, OUTLINE_THICKNESS, OVERLAY_ALPHA, ROI_OUTLINE, SEGMENT_FILL,
};
use crate::roi::Roi;
use anyhow::Result;
use jamwatch_inference::utils::masks::{ApplyMask, PolygonMask};
use jamwatch_inference::{ImageSize, Point};
use jamwatch_media::image::util::draw::{DrawLabel, DrawOutline};
use jamwatch_media::{FontVec, Image};

fn to_float(points: &[Point<i32>]) -> Vec<(f32, f32)> {
    points.iter().map(|p| (p.x as f32, p.y as f32)).collect()
}

/// Fills every detected segment and outlines it together with the ROI on an
/// overlay, then blends the overlay into the frame. With a font the
/// congestion figure is written on top.
///
/// Outlines are in the pixel coordinates of `image`.
pub fn render_congestion(
    mut image: Image,
    roi: &Roi,
    segments: &[Vec<Point<i32>>],
    congestion_percentage: f64,
    font: Option<&FontVec>,
) -> Result<Image> {
    let (width, height) = image.get_size();
    let size = ImageSize::new(width, height);

    let mut overlay = image.clone();
    overlay.draw_outline(&to_float(roi.points()), ROI_OUTLINE, OUTLINE_THICKNESS);
    for segment in segments {
        overlay.draw_outline(&to_float(segment), SEGMENT_FILL, OUTLINE_THICKNESS);
        let mask = PolygonMask::rasterize(segment, size);
        overlay.layering_mask(mask.bits(), SEGMENT_FILL)?;
    }
    image.blend(&overlay, OVERLAY_ALPHA)?;

    if let Some(font) = font {
        let label = format!("Congestion: {:.2}%", congestion_percentage);
        image.draw_label(&label, LABEL_ORIGIN, LABEL_HEIGHT, LABEL_COLOR, font);
    }

    Ok(image)
}

#[test]
fn blends_segments_and_roi_over_frame() -> Result<()> {
    let roi = Roi::new([
        Point::new(5, 5),
        Point::new(35, 5),
        Point::new(35, 35),
        Point::new(5, 35),
    ]);
    let segment = vec![
        Point::new(10, 10),
        Point::new(20, 10),
        Point::new(20, 20),
        Point::new(10, 20),
    ];
    let image = Image::from_frame(jamwatch_media::RgbImage::from_pixel(
        40,
        40,
        jamwatch_media::Rgb([100, 100, 100]),
    ));

    let rendered = render_congestion(image, &roi, &[segment], 12.5, None)?;

    // Half of the saturated fill over a grey frame.
    assert_eq!(rendered.frame().get_pixel(15, 15).0, [100, 100, 178]);
    assert_eq!(rendered.frame().get_pixel(20, 5).0, [50, 178, 50]);
    assert_eq!(rendered.frame().get_pixel(38, 38).0, [100, 100, 100]);
    Ok(())
}

#[test]
fn keeps_frame_size() -> Result<()> {
    let roi = Roi::new([
        Point::new(0, 0),
        Point::new(300, 0),
        Point::new(300, 100),
        Point::new(0, 100),
    ]);
    let image = Image::from_frame(jamwatch_media::RgbImage::new(400, 200));

    let rendered = render_congestion(image, &roi, &[], 0.0, None)?;

    assert_eq!(rendered.get_size(), (400, 200));
    Ok(())
}
