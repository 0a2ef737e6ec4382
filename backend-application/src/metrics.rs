use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    sync_requests: AtomicU64,
    events_processed: AtomicU64,
    events_duplicate: AtomicU64,
    events_failed: AtomicU64,
    assets_created: AtomicU64,
}

impl Metrics {
    pub fn record_sync_request(&self) {
        self.sync_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processed(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.events_duplicate.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_asset_created(&self) {
        self.assets_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let requests = self.sync_requests.load(Ordering::Relaxed);
        let processed = self.events_processed.load(Ordering::Relaxed);
        let duplicate = self.events_duplicate.load(Ordering::Relaxed);
        let failed = self.events_failed.load(Ordering::Relaxed);
        let created = self.assets_created.load(Ordering::Relaxed);

        format!(
            "# TYPE asset_sync_requests_total counter\n\
asset_sync_requests_total {}\n\
# TYPE asset_sync_events_processed_total counter\n\
asset_sync_events_processed_total {}\n\
# TYPE asset_sync_events_duplicate_total counter\n\
asset_sync_events_duplicate_total {}\n\
# TYPE asset_sync_events_failed_total counter\n\
asset_sync_events_failed_total {}\n\
# TYPE asset_sync_assets_created_total counter\n\
asset_sync_assets_created_total {}\n",
            requests, processed, duplicate, failed, created
        )
    }
}
