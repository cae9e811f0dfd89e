use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::ApplyResult;

#[derive(Debug, Default)]
pub struct Metrics {
    previews: AtomicU64,
    snapshot_errors: AtomicU64,
    applies: AtomicU64,
    apply_failures: AtomicU64,
    records_added: AtomicU64,
    records_removed: AtomicU64,
    records_moved: AtomicU64,
    records_skipped: AtomicU64,
}

impl Metrics {
    pub fn record_preview(&self) {
        self.previews.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_snapshot_error(&self) {
        self.snapshot_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_apply(&self, result: &ApplyResult) {
        self.applies.fetch_add(1, Ordering::Relaxed);
        self.records_added
            .fetch_add(result.added as u64, Ordering::Relaxed);
        self.records_removed
            .fetch_add(result.removed as u64, Ordering::Relaxed);
        self.records_moved
            .fetch_add(result.moved as u64, Ordering::Relaxed);
        self.records_skipped
            .fetch_add(result.skipped as u64, Ordering::Relaxed);
    }

    pub fn record_apply_failure(&self) {
        self.apply_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("stash_previews_total", &self.previews),
            ("stash_snapshot_errors_total", &self.snapshot_errors),
            ("stash_applies_total", &self.applies),
            ("stash_apply_failures_total", &self.apply_failures),
            ("stash_records_added_total", &self.records_added),
            ("stash_records_removed_total", &self.records_removed),
            ("stash_records_moved_total", &self.records_moved),
            ("stash_records_skipped_total", &self.records_skipped),
        ];

        let mut out = String::new();
        for (name, counter) in counters {
            out.push_str(&format!(
                "# TYPE {} counter\n{} {}\n",
                name,
                name,
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}
