use crate::cache::CameraCache;
use crate::pipeline::{CameraPipeline, PipelineError};
use crate::roi::RoiTable;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
}

/// Keeps the cache filled by running the pipeline for every configured
/// camera. Refresh cycles never overlap; readers never wait for them.
pub struct RefreshScheduler {
    cache: Arc<CameraCache>,
    pipeline: CameraPipeline,
    table: Arc<RoiTable>,
    refresh_period: Duration,
    running: Mutex<()>,
    cycles_started: AtomicU64,
}

impl RefreshScheduler {
    pub fn new(
        cache: Arc<CameraCache>,
        pipeline: CameraPipeline,
        table: Arc<RoiTable>,
        refresh_period: Duration,
    ) -> Self {
        RefreshScheduler {
            cache,
            pipeline,
            table,
            refresh_period,
            running: Mutex::new(()),
            cycles_started: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<CameraCache> {
        &self.cache
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_period
    }

    /// Runs a cycle only if the cache has gone stale, checked after any
    /// in-flight cycle has finished.
    pub async fn refresh_if_needed(&self) -> Option<RefreshSummary> {
        let _running = self.running.lock().await;
        if !self.cache.needs_refresh() {
            debug!("Cache still fresh, skipping refresh");
            return None;
        }

        Some(self.refresh_all().await)
    }

    /// Queues a refresh on behalf of an outside request.
    ///
    /// Requests are merged: once any cycle has started after the request was
    /// made, the request counts as served and no further cycle runs for it.
    pub fn request_refresh(self: &Arc<Self>) -> JoinHandle<Option<RefreshSummary>> {
        let seen = self.cycles_started.load(Ordering::Acquire);
        let scheduler = self.clone();

        tokio::spawn(async move {
            let _running = scheduler.running.lock().await;
            if scheduler.cycles_started.load(Ordering::Acquire) != seen {
                debug!("Refresh already ran since it was requested, skipping");
                return None;
            }

            Some(scheduler.refresh_all().await)
        })
    }

    /// One full cycle over every configured camera. Callers hold `running`.
    async fn refresh_all(&self) -> RefreshSummary {
        self.cycles_started.fetch_add(1, Ordering::AcqRel);
        info!("Updating cache for {} cameras", self.table.len());
        let mut summary = RefreshSummary::default();

        for camera_id in self.table.camera_ids() {
            match self.pipeline.process_camera(camera_id, &self.table).await {
                Ok(result) => {
                    self.cache.update(result);
                    summary.refreshed += 1;
                }
                Err(err @ PipelineError::RoiNotFound(_)) => {
                    error!("{}", err);
                    summary.failed += 1;
                }
                Err(err) => {
                    warn!("Error processing camera {}: {}", err.camera_id(), err);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Cache update finished: {} refreshed, {} failed",
            summary.refreshed, summary.failed
        );
        summary
    }

    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.refresh_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.refresh_if_needed().await;
        }
    }

    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        info!(
            "Refreshing every {:?}, results stale after {:?}",
            self.refresh_period,
            self.cache.stale_after()
        );
        tokio::spawn(self.clone().run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{square_table, temp_result_dir, FixedDetector, MemorySource};
    use jamwatch_inference::engine::SharedDetector;
    use jamwatch_inference::{ImageSize, Segment};

    fn scheduler(name: &str, source: Arc<MemorySource>, stale_after: Duration) -> RefreshScheduler {
        let detector: SharedDetector = Arc::new(FixedDetector::new(vec![Segment::from(vec![
            [0.0, 0.0],
            [100.0, 0.0],
            [100.0, 25.0],
            [0.0, 25.0],
        ])]));
        let pipeline = CameraPipeline::new(
            detector,
            source,
            ImageSize::new(160, 160),
            temp_result_dir(name),
        );

        RefreshScheduler::new(
            Arc::new(CameraCache::new(stale_after)),
            pipeline,
            Arc::new(square_table(&["A", "B"])),
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn failing_camera_does_not_block_others() {
        let source = Arc::new(MemorySource::with_cameras(&["A"]));
        let scheduler = scheduler("sched-partial", source, Duration::from_secs(5));

        let summary = scheduler.refresh_all().await;

        assert_eq!(summary, RefreshSummary { refreshed: 1, failed: 1 });
        assert_eq!(scheduler.cache().get("A").unwrap().congestion_percentage, 25.0);
        assert!(scheduler.cache().get("B").is_none());
        assert_eq!(scheduler.cache().get_all().len(), 1);
    }

    #[tokio::test]
    async fn failed_camera_keeps_last_result() {
        let source = Arc::new(MemorySource::with_cameras(&["A", "B"]));
        let scheduler = scheduler("sched-keep", source.clone(), Duration::from_secs(5));

        scheduler.refresh_all().await;
        let first = scheduler.cache().get("B").unwrap();

        source.remove("B");
        let summary = scheduler.refresh_all().await;

        assert_eq!(summary.failed, 1);
        assert_eq!(scheduler.cache().get("B"), Some(first));
        assert!(scheduler.cache().get("A").is_some());
    }

    #[tokio::test]
    async fn refresh_if_needed_respects_staleness_window() {
        let source = Arc::new(MemorySource::with_cameras(&["A", "B"]));
        let scheduler = scheduler("sched-window", source, Duration::from_millis(200));

        assert!(scheduler.cache().needs_refresh());
        assert!(scheduler.refresh_if_needed().await.is_some());
        assert!(!scheduler.cache().needs_refresh());

        // A manual refresh just happened, the scheduled tick must not redo it.
        assert!(scheduler.refresh_if_needed().await.is_none());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(scheduler.cache().needs_refresh());
        assert!(scheduler.refresh_if_needed().await.is_some());
    }

    #[tokio::test]
    async fn background_loop_fills_cache() {
        let source = Arc::new(MemorySource::with_cameras(&["A", "B"]));
        let scheduler = Arc::new(scheduler("sched-loop", source, Duration::from_secs(5)));

        let handle = scheduler.spawn();
        for _ in 0..100 {
            if scheduler.cache().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.abort();

        assert_eq!(scheduler.cache().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_cycle() {
        let detector = Arc::new(FixedDetector::new(Vec::new()));
        let pipeline = CameraPipeline::new(
            detector.clone(),
            Arc::new(MemorySource::with_cameras(&["A", "B"])),
            ImageSize::new(160, 160),
            temp_result_dir("sched-merge"),
        );
        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::new(CameraCache::new(Duration::from_secs(5))),
            pipeline,
            Arc::new(square_table(&["A", "B"])),
            Duration::from_secs(30),
        ));

        let requests: Vec<_> = (0..10).map(|_| scheduler.request_refresh()).collect();
        let mut served = 0;
        for request in requests {
            if request.await.unwrap().is_some() {
                served += 1;
            }
        }

        assert_eq!(served, 1);
        assert_eq!(detector.calls(), 2);

        // A request after the cycle finished gets a fresh one.
        assert!(scheduler.request_refresh().await.unwrap().is_some());
        assert_eq!(detector.calls(), 4);
    }
}
