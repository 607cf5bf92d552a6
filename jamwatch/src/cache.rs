use crate::detect::result::CongestionResult;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CongestionResult>,
    last_update: Option<(Instant, DateTime<Utc>)>,
}

/// Last successful result per camera.
///
/// Freshness is tracked for the cache as a whole: any successful update makes
/// every entry fresh again, and the whole cache goes stale together once the
/// window since that update has passed.
#[derive(Debug)]
pub struct CameraCache {
    state: RwLock<CacheState>,
    stale_after: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatus {
    pub last_update: Option<DateTime<Utc>>,
    pub cameras_cached: usize,
    pub next_update_in: u64,
}

impl CameraCache {
    pub fn new(stale_after: Duration) -> Self {
        CameraCache {
            state: RwLock::new(CacheState::default()),
            stale_after,
        }
    }

    /// Replaces the entry for the result's camera and restarts the staleness
    /// window.
    pub fn update(&self, result: CongestionResult) {
        let mut state = self.state.write();
        state
            .entries
            .insert(result.camera_id.clone(), result);
        state.last_update = Some((Instant::now(), Utc::now()));
    }

    pub fn get(&self, camera_id: &str) -> Option<CongestionResult> {
        self.state.read().entries.get(camera_id).cloned()
    }

    /// Snapshot of every cached camera, ordered by camera identifier.
    pub fn get_all(&self) -> Vec<CongestionResult> {
        let mut results: Vec<CongestionResult> =
            self.state.read().entries.values().cloned().collect();
        results.sort_by(|a, b| a.camera_id.cmp(&b.camera_id));
        results
    }

    pub fn needs_refresh(&self) -> bool {
        match self.state.read().last_update {
            None => true,
            Some((instant, _)) => instant.elapsed() > self.stale_after,
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_update.map(|(_, at)| at)
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `next_update_in` counts down from the last update to the next
    /// scheduler period and never goes below zero.
    pub fn status(&self, refresh_period: Duration) -> CacheStatus {
        let state = self.state.read();
        let next_update_in = match state.last_update {
            None => refresh_period,
            Some((instant, _)) => refresh_period.saturating_sub(instant.elapsed()),
        };

        CacheStatus {
            last_update: state.last_update.map(|(_, at)| at),
            cameras_cached: state.entries.len(),
            next_update_in: next_update_in.as_secs(),
        }
    }
}
