use super::error::QueueError;
use super::model::{
    clamp_priority, ItemStatus, NewQueueItem, QueueItem, SourceRef, StatusCounts, StatusKind,
    StatusUpdate, DEFAULT_PRIORITY,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

pub const INTERRUPTED_ERROR: &str = "interrupted";

/// Serializable image of the store, used to carry the queue across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub saved_at: DateTime<Utc>,
    pub processed_all_time: u64,
    pub items: Vec<QueueItem>,
}

#[derive(Default)]
struct StoreState {
    /// Keyed by insertion sequence so iteration yields insertion order.
    items: BTreeMap<u64, QueueItem>,
    index: HashMap<Uuid, u64>,
    /// Failed item id -> id of the item that retries it.
    requeued: HashMap<Uuid, Uuid>,
    next_seq: u64,
    finalized_total: u64,
}

impl StoreState {
    fn insert(&mut self, item: QueueItem) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(item.id, seq);
        self.items.insert(seq, item);
    }

    fn item_mut(&mut self, id: Uuid) -> Result<&mut QueueItem, QueueError> {
        let seq = *self.index.get(&id).ok_or(QueueError::NotFound(id))?;
        self.items.get_mut(&seq).ok_or(QueueError::NotFound(id))
    }
}

/// In-memory owner of every queue item.
///
/// All mutation is serialized through a single write lock. Readers get cloned
/// records and never observe a partially applied change. `claim_batch` is the
/// only way to move an item out of `pending`, so two processing passes can
/// never hold the same item.
#[derive(Default)]
pub struct QueueStore {
    state: RwLock<StoreState>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single pending item.
    pub fn add(&self, new_item: NewQueueItem) -> Result<Uuid, QueueError> {
        let item = Self::build_item(new_item, Utc::now())?;
        let id = item.id;
        self.state.write().insert(item);
        Ok(id)
    }

    /// Insert several items atomically: either all are accepted or none are.
    pub fn add_many(&self, new_items: Vec<NewQueueItem>) -> Result<Vec<Uuid>, QueueError> {
        let now = Utc::now();
        let items = new_items
            .into_iter()
            .map(|new_item| Self::build_item(new_item, now))
            .collect::<Result<Vec<_>, _>>()?;

        let ids = items.iter().map(|item| item.id).collect();
        let mut state = self.state.write();
        for item in items {
            state.insert(item);
        }
        Ok(ids)
    }

    pub fn get(&self, id: Uuid) -> Result<QueueItem, QueueError> {
        let state = self.state.read();
        state
            .index
            .get(&id)
            .and_then(|seq| state.items.get(seq))
            .cloned()
            .ok_or(QueueError::NotFound(id))
    }

    /// Items in insertion order, optionally filtered by status.
    pub fn list_by_status(&self, status: Option<StatusKind>) -> Vec<QueueItem> {
        self.state
            .read()
            .items
            .values()
            .filter(|item| status.map_or(true, |s| item.kind() == s))
            .cloned()
            .collect()
    }

    /// Atomically move up to `max_items` pending items to `processing`.
    ///
    /// Candidates are ordered by priority (highest first), then creation time
    /// (oldest first), then insertion order.
    pub fn claim_batch(&self, max_items: usize) -> Vec<QueueItem> {
        if max_items == 0 {
            return Vec::new();
        }

        let mut state = self.state.write();
        let mut candidates: Vec<(i32, DateTime<Utc>, u64)> = state
            .items
            .iter()
            .filter(|(_, item)| item.kind() == StatusKind::Pending)
            .map(|(seq, item)| (item.priority, item.created_at, *seq))
            .collect();

        candidates.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        });

        let now = Utc::now();
        let claimed: Vec<QueueItem> = candidates
            .into_iter()
            .take(max_items)
            .filter_map(|(_, _, seq)| {
                state.items.get_mut(&seq).map(|item| {
                    item.status = ItemStatus::Processing { progress: 0.0 };
                    item.updated_at = now;
                    item.clone()
                })
            })
            .collect();

        if !claimed.is_empty() {
            tracing::debug!(claimed = claimed.len(), "Claimed queue batch");
        }

        claimed
    }

    /// Apply a progress or final status to an item that is currently processing.
    pub fn update(&self, id: Uuid, update: StatusUpdate) -> Result<QueueItem, QueueError> {
        let mut state = self.state.write();
        let item = state.item_mut(id)?;

        if item.kind() != StatusKind::Processing {
            return Err(QueueError::InvalidTransition {
                id,
                status: item.kind(),
                expected: StatusKind::Processing,
            });
        }

        let finalized = !matches!(update, StatusUpdate::Progress(_));
        item.status = match update {
            StatusUpdate::Progress(progress) => ItemStatus::Processing {
                progress: if progress.is_nan() {
                    0.0
                } else {
                    progress.clamp(0.0, 1.0)
                },
            },
            StatusUpdate::Completed(output) => ItemStatus::Completed { output },
            StatusUpdate::Failed(error) => ItemStatus::Failed { error },
        };
        item.updated_at = Utc::now();
        let updated = item.clone();

        if finalized {
            state.finalized_total += 1;
        }

        Ok(updated)
    }

    /// Remove items in the given status, or every non-processing item for `None`.
    ///
    /// Processing items are never removed.
    pub fn clear(&self, status: Option<StatusKind>) -> usize {
        if status == Some(StatusKind::Processing) {
            return 0;
        }

        let mut state = self.state.write();
        let doomed: Vec<(u64, Uuid)> = state
            .items
            .iter()
            .filter(|(_, item)| {
                item.kind() != StatusKind::Processing
                    && status.map_or(true, |s| item.kind() == s)
            })
            .map(|(seq, item)| (*seq, item.id))
            .collect();

        for (seq, id) in &doomed {
            state.items.remove(seq);
            state.index.remove(id);
        }
        if !state.requeued.is_empty() {
            let gone: HashSet<Uuid> = doomed.iter().map(|(_, id)| *id).collect();
            state
                .requeued
                .retain(|failed, retry| !gone.contains(failed) && !gone.contains(retry));
        }

        doomed.len()
    }

    /// Create a fresh pending attempt for a failed item.
    ///
    /// The failed item is left untouched as history.
    pub fn requeue(&self, id: Uuid) -> Result<Uuid, QueueError> {
        let mut state = self.state.write();
        Self::requeue_locked(&mut state, id, Utc::now())
    }

    /// Requeue every failed item whose attempt number is below `max_attempts`
    /// and which has not been requeued yet. Returns `(failed_id, new_id)` pairs.
    pub fn requeue_failed(&self, max_attempts: u32) -> Vec<(Uuid, Uuid)> {
        let mut state = self.state.write();
        let eligible: Vec<Uuid> = state
            .items
            .values()
            .filter(|item| {
                item.kind() == StatusKind::Failed
                    && item.attempt < max_attempts
                    && !state.requeued.contains_key(&item.id)
            })
            .map(|item| item.id)
            .collect();

        let now = Utc::now();
        eligible
            .into_iter()
            .filter_map(|id| {
                Self::requeue_locked(&mut state, id, now)
                    .ok()
                    .map(|new_id| (id, new_id))
            })
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        let state = self.state.read();
        let mut counts = StatusCounts::default();
        for item in state.items.values() {
            counts.record(item.kind());
        }
        counts
    }

    /// Number of items finalized as completed or failed since the store was
    /// created, including items cleared since.
    pub fn processed_all_time(&self) -> u64 {
        self.state.read().finalized_total
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.read();
        QueueSnapshot {
            saved_at: Utc::now(),
            processed_all_time: state.finalized_total,
            items: state.items.values().cloned().collect(),
        }
    }

    /// Load a snapshot into an empty store.
    ///
    /// Items caught mid-processing are restored as failed with an
    /// `interrupted` error. Ids already present are skipped, and the
    /// all-time counter is only carried over into an empty store. Returns the
    /// number of items restored.
    pub fn restore(&self, snapshot: QueueSnapshot) -> usize {
        let mut state = self.state.write();
        let was_empty = state.items.is_empty();
        let mut restored = 0;
        let now = Utc::now();

        for mut item in snapshot.items {
            if state.index.contains_key(&item.id) {
                continue;
            }
            if item.kind() == StatusKind::Processing {
                item.status = ItemStatus::Failed {
                    error: INTERRUPTED_ERROR.to_string(),
                };
                item.updated_at = now;
            }
            if let Some(original) = item.retry_of {
                state.requeued.insert(original, item.id);
            }
            state.insert(item);
            restored += 1;
        }

        if was_empty {
            state.finalized_total += snapshot.processed_all_time;
        }
        restored
    }

    fn requeue_locked(
        state: &mut StoreState,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Uuid, QueueError> {
        if let Some(retry_id) = state.requeued.get(&id) {
            return Err(QueueError::AlreadyRequeued {
                id,
                retry_id: *retry_id,
            });
        }

        let failed = state.item_mut(id)?;
        if failed.kind() != StatusKind::Failed {
            return Err(QueueError::InvalidTransition {
                id,
                status: failed.kind(),
                expected: StatusKind::Failed,
            });
        }

        let retry = QueueItem {
            id: Uuid::new_v4(),
            source: failed.source.clone(),
            priority: failed.priority,
            status: ItemStatus::Pending,
            subreddit: failed.subreddit.clone(),
            attempt: failed.attempt + 1,
            retry_of: Some(id),
            created_at: now,
            updated_at: now,
        };
        let retry_id = retry.id;

        state.requeued.insert(id, retry_id);
        state.insert(retry);
        Ok(retry_id)
    }

    fn build_item(new_item: NewQueueItem, now: DateTime<Utc>) -> Result<QueueItem, QueueError> {
        let source_id = new_item
            .source_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        let source = match (source_id, new_item.payload) {
            (Some(source_id), None) => SourceRef::Remote { source_id },
            (None, Some(payload)) => {
                if payload.title.trim().is_empty() && payload.text.trim().is_empty() {
                    return Err(QueueError::InvalidInput(
                        "content must have a title or text".to_string(),
                    ));
                }
                SourceRef::Resolved { payload }
            }
            (Some(_), Some(_)) => {
                return Err(QueueError::InvalidInput(
                    "provide either a source id or content, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(QueueError::InvalidInput(
                    "item must carry a source id or content".to_string(),
                ))
            }
        };

        let subreddit = new_item
            .subreddit
            .map(|s| s.trim().trim_start_matches("r/").to_string())
            .filter(|s| !s.is_empty());

        Ok(QueueItem {
            id: Uuid::new_v4(),
            source,
            priority: clamp_priority(new_item.priority.unwrap_or(DEFAULT_PRIORITY)),
            status: ItemStatus::Pending,
            subreddit,
            attempt: 1,
            retry_of: None,
            created_at: now,
            updated_at: now,
        })
    }
}
