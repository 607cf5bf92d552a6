pub mod external_detector;

pub use external_detector::ExternalDetector;
