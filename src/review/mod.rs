// SPDX-License-Identifier: BUSL-1.1
//! Human-in-the-loop review: a short-lived pending-review store plus an
//! append-only feedback log. Grounded on the original
//! `api/routes/review.py` (`_pending_reviews`, `log_feedback`,
//! `get_feedback_stats`).

use crate::types::{ClassifiedItem, DishFeedbackStats, FeedbackRecord, FeedbackStats, ReviewRecord};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

/// Holds items awaiting human review, keyed by request id, until
/// corrections are submitted or the review is explicitly cleared.
#[derive(Default)]
pub struct ReviewStore {
    pending: Mutex<HashMap<String, Vec<ClassifiedItem>>>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, request_id: impl Into<String>, all_items: Vec<ClassifiedItem>) {
        let mut guard = self.pending.lock().expect("review store mutex poisoned");
        guard.insert(request_id.into(), all_items);
    }

    pub fn get(&self, request_id: &str) -> Option<ReviewRecord> {
        let guard = self.pending.lock().expect("review store mutex poisoned");
        guard.get(request_id).map(|items| ReviewRecord {
            request_id: request_id.to_string(),
            all_items: items.clone(),
        })
    }

    pub fn clear(&self, request_id: &str) {
        let mut guard = self.pending.lock().expect("review store mutex poisoned");
        guard.remove(request_id);
    }
}

/// An append-only JSONL log of human corrections. A write failure is
/// logged and swallowed; it never fails the request that triggered it.
pub struct FeedbackLog {
    path: String,
    records: Mutex<Vec<FeedbackRecord>>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), records: Mutex::new(Vec::new()) }
    }

    /// Append one correction to the log file and to the in-memory tail
    /// used for `stats()`. Logs a warning and returns normally on I/O
    /// failure; this must never bubble up to the caller.
    pub async fn append(&self, record: FeedbackRecord) {
        {
            let mut guard = self.records.lock().expect("feedback log mutex poisoned");
            guard.push(record.clone());
        }

        if let Err(e) = self.append_to_disk(&record).await {
            tracing::warn!(error = %e, path = %self.path, "failed to append HITL feedback record");
        }
    }

    async fn append_to_disk(&self, record: &FeedbackRecord) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Aggregate statistics over every correction logged this process
    /// lifetime: totals, unique dishes, per-dish veg/non-veg counts, and
    /// the most recent 20 records.
    pub fn stats(&self) -> FeedbackStats {
        let guard = self.records.lock().expect("feedback log mutex poisoned");
        let mut dish_stats: HashMap<String, DishFeedbackStats> = HashMap::new();

        for record in guard.iter() {
            let entry = dish_stats.entry(record.dish_name.to_lowercase()).or_default();
            if record.human_label {
                entry.veg_count += 1;
            } else {
                entry.non_veg_count += 1;
            }
        }

        let recent_feedback: Vec<FeedbackRecord> = guard.iter().rev().take(20).rev().cloned().collect();

        FeedbackStats {
            total_corrections: guard.len(),
            unique_dishes: dish_stats.len(),
            dish_stats,
            recent_feedback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Method;

    fn item(name: &str) -> ClassifiedItem {
        ClassifiedItem {
            name: name.to_string(),
            price: 1.0,
            source_image: None,
            is_vegetarian: None,
            confidence: 0.2,
            method: Method::Error,
            reasoning: None,
            evidence: vec![],
            related_ingredients: vec![],
            fallback_chain: vec![],
            category: None,
            currency: "USD".into(),
        }
    }

    #[test]
    fn store_and_get_round_trips() {
        let store = ReviewStore::new();
        store.store("req-1", vec![item("Mystery Soup")]);
        let record = store.get("req-1").unwrap();
        assert_eq!(record.all_items.len(), 1);
    }

    #[test]
    fn clear_removes_the_record() {
        let store = ReviewStore::new();
        store.store("req-2", vec![item("Mystery Soup")]);
        store.clear("req-2");
        assert!(store.get("req-2").is_none());
    }

    #[test]
    fn get_on_unknown_id_returns_none() {
        let store = ReviewStore::new();
        assert!(store.get("nope").is_none());
    }

    #[tokio::test]
    async fn stats_tracks_per_dish_counts() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let log = FeedbackLog::new(tmp.path().to_string_lossy().to_string());
        log.append(FeedbackRecord {
            timestamp: "2026-01-01T00:00:00Z".into(),
            request_id: "r1".into(),
            dish_name: "Caesar Salad".into(),
            human_label: true,
            feedback_type: "hitl_correction".into(),
        })
        .await;
        log.append(FeedbackRecord {
            timestamp: "2026-01-01T00:01:00Z".into(),
            request_id: "r2".into(),
            dish_name: "caesar salad".into(),
            human_label: false,
            feedback_type: "hitl_correction".into(),
        })
        .await;

        let stats = log.stats();
        assert_eq!(stats.total_corrections, 2);
        assert_eq!(stats.unique_dishes, 1);
        let dish = stats.dish_stats.get("caesar salad").unwrap();
        assert_eq!(dish.veg_count, 1);
        assert_eq!(dish.non_veg_count, 1);
    }
}
