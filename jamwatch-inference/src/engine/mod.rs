pub mod detector_engine;

pub use detector_engine::{DetectorBackend, SharedDetector};
