use crate::inference::external::ExternalDetector;
use crate::inference::null::NullDetector;
use crate::inference::Detector;
use anyhow::Result;
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Process-wide detector handle. Built once at startup and cloned into every
/// pipeline run.
pub type SharedDetector = Arc<dyn Detector>;

#[derive(Clone, Debug)]
pub enum DetectorBackend {
    Null,
    External { endpoint: String, timeout: Duration },
}

impl DetectorBackend {
    pub fn build(self) -> Result<SharedDetector> {
        let detector: SharedDetector = match self {
            DetectorBackend::Null => Arc::new(NullDetector),
            DetectorBackend::External { endpoint, timeout } => {
                Arc::new(ExternalDetector::new(endpoint, timeout)?)
            }
        };
        info!("Detector ready: {}", detector.name());

        Ok(detector)
    }
}
