use crate::domain::queue::QueueItem;
use serde::{Deserialize, Serialize};

/// Totals over every completed item currently in the queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub artifacts: usize,
    pub total_duration_seconds: f64,
    pub total_size_bytes: u64,
    pub items_processed_all_time: u64,
    pub average_duration_seconds: f64,
    pub average_size_bytes: f64,
}

impl StatsSummary {
    /// Fold the artifacts attached to `items`. Items without an artifact are
    /// ignored.
    pub fn from_items<'a>(
        items: impl IntoIterator<Item = &'a QueueItem>,
        items_processed_all_time: u64,
    ) -> Self {
        let mut summary = Self {
            items_processed_all_time,
            ..Self::default()
        };

        for output in items.into_iter().filter_map(QueueItem::output) {
            summary.artifacts += 1;
            summary.total_duration_seconds += output.duration_seconds;
            summary.total_size_bytes += output.size_bytes;
        }

        if summary.artifacts > 0 {
            let count = summary.artifacts as f64;
            summary.average_duration_seconds = summary.total_duration_seconds / count;
            summary.average_size_bytes = summary.total_size_bytes as f64 / count;
        }

        summary
    }
}
