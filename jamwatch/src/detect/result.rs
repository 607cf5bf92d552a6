use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest congestion figure for one camera, as served by the read API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionResult {
    pub camera_id: String,
    pub image_url: String,
    pub congestion_percentage: f64,
    pub last_updated: DateTime<Utc>,
}

impl CongestionResult {
    pub fn new(camera_id: impl Into<String>, congestion_percentage: f64) -> Self {
        let camera_id = camera_id.into();
        CongestionResult {
            image_url: image_url(&camera_id),
            camera_id,
            congestion_percentage: (congestion_percentage * 100.0).round() / 100.0,
            last_updated: Utc::now(),
        }
    }
}

pub fn image_url(camera_id: &str) -> String {
    format!("/images/{}.jpg", camera_id)
}

#[test]
fn rounds_to_two_decimals() {
    let result = CongestionResult::new("cam-9", 33.33333);
    assert_eq!(result.congestion_percentage, 33.33);
    assert_eq!(result.image_url, "/images/cam-9.jpg");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["camera_id"], "cam-9");
    assert!(json["last_updated"].is_string());
}
