//! Date-keyed prediction cache
//!
//! Each date owns a `OnceCell`, so concurrent requests for the same uncached
//! date share one computation while different dates never wait on each other.
//! The map lock is only held to look up or swap a cell, never across an await.

use crate::types::Prediction;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One day's predictions, shared between the cache and its readers
pub type DayPredictions = Arc<Vec<Prediction>>;

type Slot = Arc<OnceCell<DayPredictions>>;

#[derive(Default)]
pub struct DateCache {
    slots: Mutex<HashMap<NaiveDate, Slot>>,
}

impl DateCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, date: NaiveDate) -> Slot {
        self.slots.lock().entry(date).or_default().clone()
    }

    /// Cached predictions for `date`, if computed
    pub fn get(&self, date: NaiveDate) -> Option<DayPredictions> {
        self.slots.lock().get(&date).and_then(|s| s.get().cloned())
    }

    /// Return the cached entry or run `compute` once to fill it.
    ///
    /// Callers arriving while a computation for the same date is in flight
    /// wait for it instead of starting their own.
    pub async fn get_or_compute<F, Fut>(&self, date: NaiveDate, compute: F) -> DayPredictions
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Prediction>>,
    {
        let slot = self.slot(date);
        slot.get_or_init(|| async move {
            let mut predictions = compute().await;
            predictions.sort_by(|a, b| a.display_order(b));
            Arc::new(predictions)
        })
        .await
        .clone()
    }

    /// Replace the whole entry for `date`
    pub fn insert(&self, date: NaiveDate, mut predictions: Vec<Prediction>) -> DayPredictions {
        predictions.sort_by(|a, b| a.display_order(b));
        let value = Arc::new(predictions);
        let slot = Arc::new(OnceCell::new_with(Some(value.clone())));
        self.slots.lock().insert(date, slot);
        value
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    /// Number of dates with a completed entry
    pub fn len(&self) -> usize {
        self.slots.lock().values().filter(|s| s.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Completed entries, for persistence
    pub fn snapshot(&self) -> BTreeMap<NaiveDate, Vec<Prediction>> {
        self.slots
            .lock()
            .iter()
            .filter_map(|(date, slot)| slot.get().map(|p| (*date, p.as_ref().clone())))
            .collect()
    }

    /// Load previously persisted entries, replacing any existing ones
    pub fn restore(&self, snapshot: BTreeMap<NaiveDate, Vec<Prediction>>) {
        for (date, predictions) in snapshot {
            self.insert(date, predictions);
        }
    }
}
