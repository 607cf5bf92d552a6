use anyhow::Result;
use clap::{ArgGroup, Parser};
use jamwatch_inference::engine::DetectorBackend;
use jamwatch_inference::ImageSize;
use jamwatch_media::source::{FileImageSource, HttpImageSource, SharedImageSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "jamwatch")]
#[command(about = "Serves per-camera traffic congestion estimated from vehicle segmentation")]
#[command(version)]
#[command(group(ArgGroup::new("image_source").required(true).args(["image_url", "image_dir"])))]
pub struct Config {
    /// Address the read API binds to.
    #[arg(long, env = "JAMWATCH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "JAMWATCH_PORT", default_value_t = 8000)]
    pub port: u16,

    /// JSON array of `{"camID": ..., "roi": [[x, y] x 4]}` records.
    #[arg(long, env = "JAMWATCH_ROI_TABLE", default_value = "camera_coordinates.json")]
    pub roi_table: PathBuf,

    /// Directory rendered frames are written to and served from.
    #[arg(long, env = "JAMWATCH_RESULT_DIR", default_value = "result")]
    pub result_dir: PathBuf,

    /// Snapshot URL template containing `{camera_id}`.
    #[arg(long, env = "JAMWATCH_IMAGE_URL")]
    pub image_url: Option<String>,

    /// Directory holding `{camera_id}.jpg` frames.
    #[arg(long, env = "JAMWATCH_IMAGE_DIR")]
    pub image_dir: Option<PathBuf>,

    /// Segmentation endpoint. Without it nothing is ever detected.
    #[arg(long, env = "JAMWATCH_DETECTOR_URL")]
    pub detector_url: Option<String>,

    #[arg(long, env = "JAMWATCH_RASTER_WIDTH", default_value_t = 800,
        value_parser = clap::value_parser!(u32).range(1..))]
    pub raster_width: u32,

    #[arg(long, env = "JAMWATCH_RASTER_HEIGHT", default_value_t = 800,
        value_parser = clap::value_parser!(u32).range(1..))]
    pub raster_height: u32,

    /// TrueType font for the congestion label on rendered frames.
    #[arg(long, env = "JAMWATCH_LABEL_FONT")]
    pub label_font: Option<PathBuf>,

    /// Seconds after the last update before the cache counts as stale.
    #[arg(long, env = "JAMWATCH_STALE_AFTER", default_value_t = 5)]
    pub stale_after_secs: u64,

    /// Seconds between scheduler wake-ups.
    #[arg(long, env = "JAMWATCH_REFRESH_EVERY", default_value_t = 30)]
    pub refresh_every_secs: u64,

    /// Timeout for image fetches and detector calls, in seconds.
    #[arg(long, env = "JAMWATCH_FETCH_TIMEOUT", default_value_t = 10)]
    pub fetch_timeout_secs: u64,
}

impl Config {
    pub fn image_size(&self) -> ImageSize {
        ImageSize::new(self.raster_width, self.raster_height)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_every_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn image_source(&self) -> Result<SharedImageSource> {
        let source: SharedImageSource = match (&self.image_url, &self.image_dir) {
            (Some(url), _) => Arc::new(HttpImageSource::new(url.clone(), self.fetch_timeout())?),
            (None, Some(dir)) => Arc::new(FileImageSource::new(dir.clone())),
            (None, None) => anyhow::bail!("Either --image-url or --image-dir is required"),
        };

        Ok(source)
    }

    pub fn detector_backend(&self) -> DetectorBackend {
        match &self.detector_url {
            Some(endpoint) => DetectorBackend::External {
                endpoint: endpoint.clone(),
                timeout: self.fetch_timeout(),
            },
            None => DetectorBackend::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_service_conventions() {
        let config = Config::try_parse_from(["jamwatch", "--image-dir", "frames"]).unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.image_size(), ImageSize::new(800, 800));
        assert_eq!(config.stale_after(), Duration::from_secs(5));
        assert_eq!(config.refresh_period(), Duration::from_secs(30));
        assert!(matches!(config.detector_backend(), DetectorBackend::Null));
        assert!(config.image_source().is_ok());
    }

    #[test]
    fn requires_exactly_one_image_source() {
        assert!(Config::try_parse_from(["jamwatch"]).is_err());
        assert!(Config::try_parse_from([
            "jamwatch",
            "--image-dir",
            "frames",
            "--image-url",
            "http://cams/{camera_id}.jpg",
        ])
        .is_err());
    }

    #[test]
    fn detector_url_selects_external_backend() {
        let config = Config::try_parse_from([
            "jamwatch",
            "--image-url",
            "http://cams/{camera_id}.jpg",
            "--detector-url",
            "http://model:9000/segment",
            "--raster-width",
            "640",
        ])
        .unwrap();

        assert_eq!(config.image_size(), ImageSize::new(640, 800));
        assert!(matches!(
            config.detector_backend(),
            DetectorBackend::External { endpoint, .. } if endpoint == "http://model:9000/segment"
        ));
    }

    #[test]
    fn zero_raster_is_rejected() {
        for flag in ["--raster-width", "--raster-height"] {
            assert!(Config::try_parse_from(["jamwatch", "--image-dir", "frames", flag, "0"]).is_err());
        }
        assert!(Config::try_parse_from(["jamwatch", "--image-dir", "frames", "--raster-height", "1"]).is_ok());
    }
}
