//! CatalogueEngine: in-memory query engine over the tip collection

use super::filter::TipFilter;
use super::sort::{sort_records, SortMode, TrendingPolicy};
use super::types::{CatalogueStats, Page};
use crate::storage::{StorageResult, TipStore};
use crate::tip::{relevance_score, Category, ContentRecord, CounterKind, Difficulty, TipId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, error, info, warn};

/// Default number of results for [`CatalogueEngine::get_related`]
pub const DEFAULT_RELATED_COUNT: usize = 5;

/// In-memory catalogue of tips.
///
/// The collection is loaded from the store once, on the first call that
/// needs it (or an explicit [`initialize`](Self::initialize)). After that the
/// set of tips is fixed; only view and download counters change. Every
/// read hands out clones, so callers cannot reach the engine's state.
///
/// Counter increments lock only the affected record, so the engine can be
/// shared across threads behind an `Arc`.
pub struct CatalogueEngine {
    store: Option<Arc<dyn TipStore>>,
    /// Records keyed by id
    records: DashMap<TipId, ContentRecord>,
    /// Catalogue order, set exactly once
    order: OnceLock<Vec<TipId>>,
    init_lock: Mutex<()>,
    trending: TrendingPolicy,
}

impl CatalogueEngine {
    /// Create an engine that loads from `store` on first use.
    ///
    /// Counter increments are also forwarded to the store.
    pub fn new(store: Arc<dyn TipStore>) -> Self {
        Self {
            store: Some(store),
            records: DashMap::new(),
            order: OnceLock::new(),
            init_lock: Mutex::new(()),
            trending: TrendingPolicy::default(),
        }
    }

    /// Create an engine over a fixed collection with no backing store
    pub fn from_records(records: Vec<ContentRecord>) -> Self {
        let engine = Self {
            store: None,
            records: DashMap::new(),
            order: OnceLock::new(),
            init_lock: Mutex::new(()),
            trending: TrendingPolicy::default(),
        };
        engine.install(records);
        engine
    }

    pub fn with_trending_policy(mut self, policy: TrendingPolicy) -> Self {
        self.trending = policy;
        self
    }

    /// Load the collection if it has not been loaded yet.
    ///
    /// Returns the number of tips held. Calls after a successful load do
    /// nothing. A failed load leaves the engine empty and is retried on the
    /// next call.
    pub fn initialize(&self) -> StorageResult<usize> {
        if let Some(order) = self.order.get() {
            return Ok(order.len());
        }

        let _guard = self.init_lock.lock().unwrap();
        if let Some(order) = self.order.get() {
            return Ok(order.len());
        }

        let records = match &self.store {
            Some(store) => store.load_initial_records()?,
            None => Vec::new(),
        };
        Ok(self.install(records))
    }

    pub fn is_initialized(&self) -> bool {
        self.order.get().is_some()
    }

    fn install(&self, records: Vec<ContentRecord>) -> usize {
        let mut order = Vec::with_capacity(records.len());
        for mut record in records {
            if self.records.contains_key(&record.id) {
                warn!(tip_id = %record.id, "duplicate tip id in catalogue source, keeping first");
                continue;
            }
            record.normalize_timestamps();
            order.push(record.id.clone());
            self.records.insert(record.id.clone(), record);
        }

        let count = order.len();
        if self.order.set(order).is_ok() {
            info!(count, "catalogue loaded");
        }
        count
    }

    fn ensure_initialized(&self) {
        if self.is_initialized() {
            return;
        }
        if let Err(e) = self.initialize() {
            error!(error = %e, "failed to load catalogue, serving empty results");
        }
    }

    /// Clone every record in catalogue order
    fn snapshot(&self) -> Vec<ContentRecord> {
        self.ensure_initialized();
        self.order
            .get()
            .map(|order| {
                order
                    .iter()
                    .filter_map(|id| self.records.get(id).map(|r| r.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of tips in the catalogue
    pub fn len(&self) -> usize {
        self.ensure_initialized();
        self.order.get().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Queries ===

    pub fn get_all(&self) -> Vec<ContentRecord> {
        self.snapshot()
    }

    pub fn get_by_id(&self, id: &TipId) -> Option<ContentRecord> {
        self.ensure_initialized();
        self.records.get(id).map(|r| r.clone())
    }

    pub fn get_by_category(&self, category: Category) -> Vec<ContentRecord> {
        self.filter(&TipFilter::new().with_category(category))
    }

    pub fn get_by_difficulty(&self, difficulty: Difficulty) -> Vec<ContentRecord> {
        self.filter(&TipFilter::new().with_difficulty(difficulty))
    }

    /// Case-insensitive search; an empty term returns everything
    pub fn search(&self, term: &str) -> Vec<ContentRecord> {
        let needle = term.to_lowercase();
        self.snapshot()
            .into_iter()
            .filter(|r| r.matches_search(&needle))
            .collect()
    }

    pub fn filter(&self, filter: &TipFilter) -> Vec<ContentRecord> {
        filter.apply(self.snapshot())
    }

    /// The `count` tips most relevant to `id`, excluding `id` itself.
    ///
    /// Ties keep catalogue order. Unknown ids yield an empty list.
    pub fn get_related(&self, id: &TipId, count: usize) -> Vec<ContentRecord> {
        let Some(target) = self.get_by_id(id) else {
            return Vec::new();
        };

        let mut scored: Vec<(u32, ContentRecord)> = self
            .snapshot()
            .into_iter()
            .filter(|r| &r.id != id)
            .map(|r| (relevance_score(&target, &r), r))
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(count).map(|(_, r)| r).collect()
    }

    pub fn get_stats(&self) -> CatalogueStats {
        CatalogueStats::from_records(&self.snapshot())
    }

    pub fn get_sorted_by(&self, mode: SortMode) -> Vec<ContentRecord> {
        self.get_sorted_by_at(mode, Utc::now())
    }

    /// Sort as of a given instant (only `Trending` depends on it)
    pub fn get_sorted_by_at(&self, mode: SortMode, now: DateTime<Utc>) -> Vec<ContentRecord> {
        let mut records = self.snapshot();
        sort_records(&mut records, mode, &self.trending, now);
        records
    }

    /// Filter (if given), then take one 1-based page
    pub fn get_paginated(
        &self,
        page: usize,
        page_size: usize,
        filter: Option<&TipFilter>,
    ) -> Page {
        let matches = match filter {
            Some(f) => self.filter(f),
            None => self.snapshot(),
        };
        Page::slice(matches, page, page_size)
    }

    // === Counters ===

    pub fn increment_view(&self, id: &TipId) {
        self.increment(id, CounterKind::View);
    }

    pub fn increment_download(&self, id: &TipId) {
        self.increment(id, CounterKind::Download);
    }

    fn increment(&self, id: &TipId, kind: CounterKind) {
        self.ensure_initialized();

        match self.records.get_mut(id) {
            Some(mut record) => record.increment(kind, Utc::now()),
            None => {
                debug!(tip_id = %id, ?kind, "increment for unknown tip ignored");
                return;
            }
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.persist_increment(id, kind) {
                warn!(tip_id = %id, ?kind, error = %e, "failed to persist counter increment");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> Vec<ContentRecord> {
        vec![
            ContentRecord::new("h1", Category::Health, Difficulty::Easy, "Drink water")
                .with_tags(["hydration", "morning"]),
            ContentRecord::new("w1", Category::Wealth, Difficulty::Moderate, "Automate savings")
                .with_tags(["saving"]),
            ContentRecord::new("h2", Category::Health, Difficulty::Easy, "Morning sunlight")
                .with_tags(["morning", "sleep"]),
            ContentRecord::new("j1", Category::Happiness, Difficulty::Advanced, "Gratitude log")
                .with_tags(["journal"]),
        ]
    }

    struct CountingStore {
        loads: AtomicUsize,
        increments: AtomicUsize,
    }

    impl TipStore for CountingStore {
        fn load_initial_records(&self) -> StorageResult<Vec<ContentRecord>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(sample())
        }

        fn persist_increment(&self, _id: &TipId, _kind: CounterKind) -> StorageResult<()> {
            self.increments.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingStore;

    impl TipStore for FailingStore {
        fn load_initial_records(&self) -> StorageResult<Vec<ContentRecord>> {
            Err(StorageError::DateParse("broken".into()))
        }
    }

    #[test]
    fn loads_once_on_first_use() {
        let store = Arc::new(CountingStore {
            loads: AtomicUsize::new(0),
            increments: AtomicUsize::new(0),
        });
        let engine = CatalogueEngine::new(store.clone());
        assert!(!engine.is_initialized());

        assert_eq!(engine.get_all().len(), 4);
        assert_eq!(engine.initialize().unwrap(), 4);
        engine.search("water");

        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn increments_are_forwarded_to_store() {
        let store = Arc::new(CountingStore {
            loads: AtomicUsize::new(0),
            increments: AtomicUsize::new(0),
        });
        let engine = CatalogueEngine::new(store.clone());

        engine.increment_view(&"h1".into());
        engine.increment_download(&"h1".into());
        engine.increment_view(&"missing".into());

        assert_eq!(store.increments.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_load_serves_empty_results() {
        let engine = CatalogueEngine::new(Arc::new(FailingStore));
        assert!(engine.get_all().is_empty());
        assert!(engine.initialize().is_err());
        assert!(!engine.is_initialized());
    }

    #[test]
    fn get_all_is_a_defensive_copy() {
        let engine = CatalogueEngine::from_records(sample());
        let mut all = engine.get_all();
        all[0].view_count = 999;
        all.clear();

        assert_eq!(engine.len(), 4);
        assert_eq!(engine.get_by_id(&"h1".into()).unwrap().view_count, 0);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut records = sample();
        records.push(ContentRecord::new("h1", Category::Wealth, Difficulty::Advanced, "Dup"));
        let engine = CatalogueEngine::from_records(records);

        assert_eq!(engine.len(), 4);
        assert_eq!(engine.get_by_id(&"h1".into()).unwrap().content.title, "Drink water");
    }

    #[test]
    fn related_excludes_self_and_ranks_by_score() {
        let engine = CatalogueEngine::from_records(sample());
        let related = engine.get_related(&"h1".into(), DEFAULT_RELATED_COUNT);

        assert_eq!(related.len(), 3);
        assert_eq!(related[0].id.as_str(), "h2");
        assert!(related.iter().all(|r| r.id.as_str() != "h1"));
    }

    #[test]
    fn related_for_unknown_id_is_empty() {
        let engine = CatalogueEngine::from_records(sample());
        assert!(engine.get_related(&"nope".into(), 5).is_empty());
    }

    #[test]
    fn memory_store_feeds_the_engine() {
        let engine = CatalogueEngine::new(Arc::new(MemoryStore::new(sample())));
        assert_eq!(engine.get_by_category(Category::Health).len(), 2);
        assert_eq!(engine.get_by_difficulty(Difficulty::Advanced).len(), 1);
    }
}
