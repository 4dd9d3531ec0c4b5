//! Demand pipeline: sources -> aggregation -> ranking / forecasting.
//!
//! Execution model:
//! - Source reads and model calls are synchronous, so each unit of work runs
//!   on the blocking pool while holding one of the pipeline's `worker_limit`
//!   permits. The permit lives as long as the blocking work itself, so a unit
//!   that outlives its deadline still counts against the limit.
//! - Batch operations fan out one task per catalog item; results come back in
//!   catalog order. When two items share a title, the first one wins.
//! - Every unit of work has a deadline (`item_timeout`). In batch operations an
//!   elapsed deadline skips the item (logged); for single-item requests it is
//!   an error. A single-item forecast (lookup, aggregation, model call) is one
//!   unit under one deadline.
//! - Items without observations are skipped in batch operations and rejected
//!   for single-item requests.
//! - Any other failure aborts the operation and names the item.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use stockpulse_ai::{AiError, ForecastOrchestrator, ForecastResult, RankingEngine};
use stockpulse_core::{DomainError, ItemId};
use stockpulse_inventory::{DemandAggregator, Item, MonthlyAggregate};

use crate::source::{ItemCatalog, SourceError, StockObservationSource};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum items processed concurrently.
    pub worker_limit: usize,
    /// Deadline for one item's aggregation/forecast.
    pub item_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_limit: 4,
            item_timeout: Duration::from_secs(5),
        }
    }
}

impl PipelineConfig {
    pub fn with_worker_limit(mut self, worker_limit: usize) -> Self {
        self.worker_limit = worker_limit.max(1);
        self
    }

    pub fn with_item_timeout(mut self, item_timeout: Duration) -> Self {
        self.item_timeout = item_timeout;
        self
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("upstream failure ({context}): {error}")]
    Upstream { context: String, error: SourceError },

    #[error("invalid data for item {item}: {error}")]
    InvalidData { item: String, error: DomainError },

    #[error("{item}: {error}")]
    Ai { item: String, error: AiError },

    #[error("timed out after {timeout_ms}ms: {item}")]
    Timeout { item: String, timeout_ms: u64 },

    #[error("worker failure: {0}")]
    Join(String),
}

impl PipelineError {
    fn upstream(context: impl Into<String>, error: SourceError) -> Self {
        Self::Upstream {
            context: context.into(),
            error,
        }
    }

    fn ai(item: &Item, error: AiError) -> Self {
        match error {
            AiError::InsufficientData(msg) => Self::InsufficientData(msg),
            error => Self::Ai {
                item: item.title.clone(),
                error,
            },
        }
    }
}

/// How a caller names an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Id(ItemId),
    Title(String),
}

impl core::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ItemRef::Id(id) => write!(f, "item id {id}"),
            ItemRef::Title(title) => write!(f, "item {title:?}"),
        }
    }
}

/// Batch and single-item demand operations over a catalog + observation source.
pub struct DemandPipeline<S: ?Sized, C: ?Sized> {
    source: Arc<S>,
    catalog: Arc<C>,
    orchestrator: Arc<ForecastOrchestrator>,
    workers: Arc<Semaphore>,
    config: PipelineConfig,
}

impl<S: ?Sized, C: ?Sized> Clone for DemandPipeline<S, C> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            catalog: self.catalog.clone(),
            orchestrator: self.orchestrator.clone(),
            workers: self.workers.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, C> DemandPipeline<S, C>
where
    S: StockObservationSource + ?Sized,
    C: ItemCatalog + ?Sized,
{
    pub fn new(
        source: Arc<S>,
        catalog: Arc<C>,
        orchestrator: Arc<ForecastOrchestrator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            catalog,
            orchestrator,
            workers: Arc::new(Semaphore::new(config.worker_limit.max(1))),
            config,
        }
    }

    pub fn orchestrator(&self) -> &ForecastOrchestrator {
        &self.orchestrator
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve an item by id or exact title.
    pub async fn resolve(&self, target: ItemRef) -> Result<Item, PipelineError> {
        let catalog = self.catalog.clone();
        self.run_one(target.to_string(), move || lookup(&*catalog, &target)).await
    }

    /// Monthly aggregates for one item (empty when it has no observations).
    pub async fn monthly_history(&self, item: &Item) -> Result<Vec<MonthlyAggregate>, PipelineError> {
        let source = self.source.clone();
        let item = item.clone();
        self.run_one(item.title.clone(), move || aggregate_item(&*source, &item))
            .await
    }

    /// Latest-month demand per item title; items without observations are skipped.
    pub async fn latest_demands(&self) -> Result<BTreeMap<String, f64>, PipelineError> {
        let items = self.catalog_items().await?;
        let source = self.source.clone();

        let latest = self
            .fan_out(items, move |item| {
                let history = aggregate_item(&*source, &item)?;
                match DemandAggregator::latest(&history) {
                    Some(agg) => {
                        debug!(item = %item.title, month = %agg.month, demand = agg.demand, "latest monthly demand");
                        Ok(Some((item.title, agg.demand)))
                    }
                    None => {
                        debug!(item = %item.title, "no stock observations; skipping");
                        Ok(None)
                    }
                }
            })
            .await?;

        Ok(first_per_title(latest))
    }

    /// The `k` items with the highest latest-month demand, descending.
    pub async fn top_demands(&self, k: usize) -> Result<Vec<(String, f64)>, PipelineError> {
        let latest = self.latest_demands().await?;
        let ranked = RankingEngine::top_k(latest, k);
        info!(k, returned = ranked.len(), "ranked monthly top demands");
        Ok(ranked)
    }

    /// Forecast every item that has observations, keyed by title.
    pub async fn forecast_all(&self) -> Result<BTreeMap<String, ForecastResult>, PipelineError> {
        let items = self.catalog_items().await?;
        let source = self.source.clone();
        let orchestrator = self.orchestrator.clone();

        let results = self
            .fan_out(items, move |item| {
                let history = aggregate_item(&*source, &item)?;
                if history.is_empty() {
                    debug!(item = %item.title, "no stock observations; skipping forecast");
                    return Ok(None);
                }
                let result = forecast_one(&orchestrator, &item, &history)?;
                debug!(item = %item.title, horizon = result.forecast.len(), "demand forecast computed");
                Ok(Some((item.title, result)))
            })
            .await?;

        info!(forecasts = results.len(), "batch demand forecast complete");
        Ok(first_per_title(results))
    }

    /// Forecast one item from its observed history (lookup, aggregation and
    /// model call share one deadline).
    pub async fn forecast_item(&self, target: ItemRef) -> Result<ForecastResult, PipelineError> {
        let catalog = self.catalog.clone();
        let source = self.source.clone();
        let orchestrator = self.orchestrator.clone();
        self.run_one(target.to_string(), move || {
            let item = lookup(&*catalog, &target)?;
            let history = aggregate_item(&*source, &item)?;
            forecast_one(&orchestrator, &item, &history)
        })
        .await
    }

    /// Forecast one item from a caller-supplied monthly history.
    pub async fn forecast_with_history(
        &self,
        item: &Item,
        history: Vec<MonthlyAggregate>,
    ) -> Result<ForecastResult, PipelineError> {
        let orchestrator = self.orchestrator.clone();
        let item = item.clone();
        self.run_one(item.title.clone(), move || forecast_one(&orchestrator, &item, &history))
            .await
    }

    async fn catalog_items(&self) -> Result<Vec<Item>, PipelineError> {
        let catalog = self.catalog.clone();
        self.run_one("catalog".to_string(), move || {
            catalog.items().map_err(|e| PipelineError::upstream("catalog", e))
        })
        .await
    }

    /// Run one blocking unit of work under the item deadline.
    ///
    /// Waiting for a worker permit counts against the deadline.
    async fn run_one<T, F>(&self, label: String, work: F) -> Result<T, PipelineError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    {
        let timeout = self.config.item_timeout;
        let workers = self.workers.clone();
        let unit = async move {
            let permit = match workers.acquire_owned().await {
                Ok(p) => p,
                Err(e) => return Err(PipelineError::Join(e.to_string())),
            };
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                work()
            });
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(PipelineError::Join(e.to_string())),
            }
        };
        match tokio::time::timeout(timeout, unit).await {
            Ok(result) => result.map_err(|e| match e {
                PipelineError::Join(msg) => PipelineError::Join(format!("{label}: {msg}")),
                other => other,
            }),
            Err(_) => Err(PipelineError::Timeout {
                item: label,
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Run `work` once per item on the bounded worker pool.
    ///
    /// Results keep the order of `items`. `Ok(None)` from `work` and elapsed
    /// deadlines skip the item; the first error aborts the remaining tasks.
    async fn fan_out<T, F>(&self, items: Vec<Item>, work: F) -> Result<Vec<T>, PipelineError>
    where
        T: Send + 'static,
        F: Fn(Item) -> Result<Option<T>, PipelineError> + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        let timeout = self.config.item_timeout;
        let mut tasks: JoinSet<(usize, Result<Option<T>, PipelineError>)> = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let work = work.clone();
            let workers = self.workers.clone();
            tasks.spawn(async move {
                let permit = match workers.acquire_owned().await {
                    Ok(p) => p,
                    Err(e) => return (index, Err(PipelineError::Join(e.to_string()))),
                };
                let title = item.title.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    work(item)
                });
                let result = match tokio::time::timeout(timeout, handle).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(e)) => Err(PipelineError::Join(format!("{title}: {e}"))),
                    Err(_) => {
                        warn!(
                            item = %title,
                            timeout_ms = timeout.as_millis() as u64,
                            "per-item computation exceeded deadline; skipping"
                        );
                        Ok(None)
                    }
                };
                (index, result)
            });
        }

        let mut out = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| PipelineError::Join(e.to_string()))?;
            match result {
                Ok(Some(value)) => out.push((index, value)),
                Ok(None) => {}
                Err(PipelineError::InsufficientData(msg)) => {
                    debug!(reason = %msg, "item skipped for insufficient data");
                }
                Err(e) => {
                    warn!(error = %e, "batch operation aborted");
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }
        out.sort_by_key(|(index, _)| *index);
        Ok(out.into_iter().map(|(_, value)| value).collect())
    }
}

/// Key results by title; the first occurrence (catalog order) wins.
fn first_per_title<T>(results: Vec<(String, T)>) -> BTreeMap<String, T> {
    let mut map = BTreeMap::new();
    for (title, value) in results {
        if map.contains_key(&title) {
            warn!(item = %title, "duplicate item title in catalog; keeping the first");
            continue;
        }
        map.insert(title, value);
    }
    map
}

fn lookup<C>(catalog: &C, target: &ItemRef) -> Result<Item, PipelineError>
where
    C: ItemCatalog + ?Sized,
{
    let found = match target {
        ItemRef::Id(id) => catalog.get(*id),
        ItemRef::Title(title) => catalog.find_by_title(title),
    }
    .map_err(|e| PipelineError::upstream("catalog", e))?;
    found.ok_or_else(|| PipelineError::NotFound(target.to_string()))
}

fn forecast_one(
    orchestrator: &ForecastOrchestrator,
    item: &Item,
    history: &[MonthlyAggregate],
) -> Result<ForecastResult, PipelineError> {
    orchestrator
        .forecast(item.id, &item.title, history, item.abc_category)
        .map_err(|e| PipelineError::ai(item, e))
}

fn aggregate_item<S>(source: &S, item: &Item) -> Result<Vec<MonthlyAggregate>, PipelineError>
where
    S: StockObservationSource + ?Sized,
{
    let observations = source
        .observations_for(item.id)
        .map_err(|e| PipelineError::upstream(format!("observations for {}", item.title), e))?;
    DemandAggregator::aggregate(&observations).map_err(|error| PipelineError::InvalidData {
        item: item.title.clone(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{DateTime, TimeZone, Utc};
    use stockpulse_ai::{ExogenousMatrix, ForecastModel, ModelRegistry};
    use stockpulse_core::{AbcCategory, Month};
    use stockpulse_inventory::StockObservation;

    use crate::source::InMemoryInventoryStore;

    /// Forecasts the restock regressor flat across the horizon.
    #[derive(Debug)]
    struct RestockEcho;

    impl ForecastModel for RestockEcho {
        fn forecast(&self, steps: usize, exog: &ExogenousMatrix) -> Result<Vec<f64>, AiError> {
            Ok(exog.rows().iter().take(steps).map(|r| r.restock_quantity).collect())
        }
    }

    /// Sleeps longer than any test deadline.
    #[derive(Debug)]
    struct Sluggish;

    impl ForecastModel for Sluggish {
        fn forecast(&self, steps: usize, _exog: &ExogenousMatrix) -> Result<Vec<f64>, AiError> {
            std::thread::sleep(Duration::from_millis(400));
            Ok(vec![0.0; steps])
        }
    }

    /// Tracks the peak number of concurrent calls.
    #[derive(Debug, Default)]
    struct Gauge {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[derive(Debug)]
    struct Gauged(Arc<Gauge>, Duration);

    impl ForecastModel for Gauged {
        fn forecast(&self, steps: usize, _exog: &ExogenousMatrix) -> Result<Vec<f64>, AiError> {
            let now = self.0.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.0.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.1);
            self.0.active.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![1.0; steps])
        }
    }

    /// Store whose catalog or observation reads fail.
    #[derive(Debug)]
    struct Outage {
        inner: Arc<InMemoryInventoryStore>,
        catalog_down: bool,
    }

    impl StockObservationSource for Outage {
        fn observations_for(&self, item_id: ItemId) -> Result<Vec<StockObservation>, SourceError> {
            if self.catalog_down {
                return self.inner.observations_for(item_id);
            }
            Err(SourceError::Unavailable("stock collection offline".to_string()))
        }
    }

    impl ItemCatalog for Outage {
        fn items(&self) -> Result<Vec<Item>, SourceError> {
            if self.catalog_down {
                return Err(SourceError::Unavailable("listing collection offline".to_string()));
            }
            self.inner.items()
        }

        fn get(&self, item_id: ItemId) -> Result<Option<Item>, SourceError> {
            if self.catalog_down {
                return Err(SourceError::Unavailable("listing collection offline".to_string()));
            }
            self.inner.get(item_id)
        }
    }

    /// Store that sleeps before answering. With `only` set, just that
    /// item's observation reads are slow.
    #[derive(Debug)]
    struct Laggy {
        inner: Arc<InMemoryInventoryStore>,
        latency: Duration,
        only: Option<ItemId>,
    }

    impl StockObservationSource for Laggy {
        fn observations_for(&self, item_id: ItemId) -> Result<Vec<StockObservation>, SourceError> {
            if self.only.is_none_or(|slow| slow == item_id) {
                std::thread::sleep(self.latency);
            }
            self.inner.observations_for(item_id)
        }
    }

    impl ItemCatalog for Laggy {
        fn items(&self) -> Result<Vec<Item>, SourceError> {
            if self.only.is_none() {
                std::thread::sleep(self.latency);
            }
            self.inner.items()
        }

        fn get(&self, item_id: ItemId) -> Result<Option<Item>, SourceError> {
            if self.only.is_none() {
                std::thread::sleep(self.latency);
            }
            self.inner.get(item_id)
        }
    }

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, m, d, 9, 0, 0).unwrap()
    }

    fn add_item(store: &InMemoryInventoryStore, title: &str, abc: Option<AbcCategory>, quantities: &[(u32, u32, f64)]) -> Item {
        let mut item = Item::new(ItemId::new(), title).unwrap();
        item.abc_category = abc;
        store.upsert_item(item.clone()).unwrap();
        store
            .record_all(quantities.iter().map(|(m, d, q)| StockObservation::new(item.id, at(*m, *d), *q)))
            .unwrap();
        item
    }

    fn pipeline<T>(store: Arc<T>, registry: ModelRegistry, config: PipelineConfig) -> DemandPipeline<T, T>
    where
        T: StockObservationSource + ItemCatalog,
    {
        let orchestrator = Arc::new(ForecastOrchestrator::new(Arc::new(registry)));
        DemandPipeline::new(store.clone(), store, orchestrator, config)
    }

    /// Three items with observations, one without.
    fn seeded_store() -> Arc<InMemoryInventoryStore> {
        let store = Arc::new(InMemoryInventoryStore::new());
        // latest month March: 10 + 12 - 5 = 17
        add_item(&store, "Gloves", Some(AbcCategory::A), &[(2, 3, 40.0), (3, 1, 10.0), (3, 10, 15.0), (3, 20, 12.0)]);
        // latest month March: 50 + 50 - 0 = 100
        add_item(&store, "Syringe", Some(AbcCategory::B), &[(3, 2, 50.0)]);
        // latest month April: 8 + 4 - 0 = 12
        add_item(&store, "Gown", None, &[(1, 5, 30.0), (4, 2, 8.0), (4, 9, 4.0)]);
        add_item(&store, "Ventilator", Some(AbcCategory::C), &[]);
        store
    }

    fn full_registry() -> ModelRegistry {
        ModelRegistry::builder()
            .register("Gloves", RestockEcho)
            .register("Syringe", RestockEcho)
            .register("Gown", RestockEcho)
            .register("Ventilator", RestockEcho)
            .build()
    }

    #[tokio::test]
    async fn latest_demands_skip_items_without_observations() {
        let p = pipeline(seeded_store(), full_registry(), PipelineConfig::default());
        let latest = p.latest_demands().await.unwrap();

        assert_eq!(latest.len(), 3);
        assert_eq!(latest["Gloves"], 17.0);
        assert_eq!(latest["Syringe"], 100.0);
        assert_eq!(latest["Gown"], 12.0);
        assert!(!latest.contains_key("Ventilator"));
    }

    #[tokio::test]
    async fn top_demands_rank_descending_and_truncate() {
        let p = pipeline(seeded_store(), full_registry(), PipelineConfig::default());
        let top = p.top_demands(2).await.unwrap();
        assert_eq!(top, vec![("Syringe".to_string(), 100.0), ("Gloves".to_string(), 17.0)]);
        assert!(p.top_demands(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn forecast_all_covers_items_with_history() {
        let p = pipeline(seeded_store(), full_registry(), PipelineConfig::default());
        let all = p.forecast_all().await.unwrap();

        assert_eq!(all.keys().cloned().collect::<Vec<_>>(), vec!["Gloves", "Gown", "Syringe"]);
        let gloves = &all["Gloves"];
        // February: single snapshot -> demand 80; March -> 17.
        assert_eq!(gloves.previous_demand, vec![80.0, 17.0]);
        // mean restock over (0, 5) = 2.5
        assert_eq!(gloves.forecast, vec![2.5; 6]);
    }

    #[tokio::test]
    async fn forecast_all_propagates_missing_model() {
        let registry = ModelRegistry::builder().register("Gloves", RestockEcho).build();
        let p = pipeline(seeded_store(), registry, PipelineConfig::default());
        let err = p.forecast_all().await.unwrap_err();
        assert!(matches!(err, PipelineError::Ai { error: AiError::ModelNotFound(_), .. }));
    }

    #[tokio::test]
    async fn forecast_all_skips_items_past_deadline() {
        let registry = ModelRegistry::builder()
            .register("Gloves", RestockEcho)
            .register("Syringe", Sluggish)
            .register("Gown", RestockEcho)
            .build();
        let config = PipelineConfig::default().with_item_timeout(Duration::from_millis(100));
        let p = pipeline(seeded_store(), registry, config);

        let all = p.forecast_all().await.unwrap();
        assert!(all.contains_key("Gloves"));
        assert!(all.contains_key("Gown"));
        assert!(!all.contains_key("Syringe"));
    }

    #[tokio::test]
    async fn worker_limit_bounds_concurrency() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let gauge = Arc::new(Gauge::default());
        let mut builder = ModelRegistry::builder();
        for i in 0..8 {
            let title = format!("Item {i}");
            add_item(&store, &title, None, &[(1, 1, 5.0)]);
            builder = builder.register(title, Gauged(gauge.clone(), Duration::from_millis(30)));
        }
        let config = PipelineConfig::default()
            .with_worker_limit(2)
            .with_item_timeout(Duration::from_secs(10));
        let p = pipeline(store, builder.build(), config);

        let all = p.forecast_all().await.unwrap();
        assert_eq!(all.len(), 8);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn timed_out_work_keeps_its_worker_permit() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let gauge = Arc::new(Gauge::default());
        let mut builder = ModelRegistry::builder();
        for i in 0..4 {
            let title = format!("Item {i}");
            add_item(&store, &title, None, &[(1, 1, 5.0)]);
            builder = builder.register(title, Gauged(gauge.clone(), Duration::from_millis(400)));
        }
        let config = PipelineConfig::default()
            .with_worker_limit(1)
            .with_item_timeout(Duration::from_millis(50));
        let p = pipeline(store, builder.build(), config);

        let all = p.forecast_all().await.unwrap();
        assert!(all.is_empty());
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn observation_outage_is_upstream_failure() {
        let store = Arc::new(Outage { inner: seeded_store(), catalog_down: false });
        let p = pipeline(store, full_registry(), PipelineConfig::default());

        let err = p.latest_demands().await.unwrap_err();
        assert!(matches!(err, PipelineError::Upstream { error: SourceError::Unavailable(_), .. }));
        let err = p.forecast_all().await.unwrap_err();
        assert!(matches!(err, PipelineError::Upstream { .. }));
        let err = p.forecast_item(ItemRef::Title("Gloves".to_string())).await.unwrap_err();
        assert!(matches!(err, PipelineError::Upstream { .. }));
    }

    #[tokio::test]
    async fn catalog_outage_is_upstream_failure() {
        let store = Arc::new(Outage { inner: seeded_store(), catalog_down: true });
        let p = pipeline(store, full_registry(), PipelineConfig::default());

        for err in [
            p.top_demands(3).await.unwrap_err(),
            p.forecast_all().await.unwrap_err(),
            p.forecast_item(ItemRef::Title("Gloves".to_string())).await.unwrap_err(),
            p.resolve(ItemRef::Id(ItemId::new())).await.unwrap_err(),
        ] {
            match err {
                PipelineError::Upstream { context, .. } => assert_eq!(context, "catalog"),
                other => panic!("expected upstream failure, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn duplicate_titles_keep_first_catalog_entry() {
        let inner = Arc::new(InMemoryInventoryStore::new());
        let first: ItemId = "0190a1b2-0000-7000-8000-000000000001".parse().unwrap();
        let second: ItemId = "0190a1b2-0000-7000-8000-000000000002".parse().unwrap();
        for (id, quantity) in [(first, 10.0), (second, 30.0)] {
            inner.upsert_item(Item::new(id, "Gloves").unwrap()).unwrap();
            inner.record(StockObservation::new(id, at(3, 1), quantity)).unwrap();
        }
        // The second entry finishes last.
        let store = Arc::new(Laggy { inner, latency: Duration::from_millis(80), only: Some(second) });
        let p = pipeline(store, full_registry(), PipelineConfig::default());

        let latest = p.latest_demands().await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest["Gloves"], 20.0);

        let all = p.forecast_all().await.unwrap();
        assert_eq!(all["Gloves"].previous_demand, vec![20.0]);
        let single = p.forecast_item(ItemRef::Title("Gloves".to_string())).await.unwrap();
        assert_eq!(single, all["Gloves"]);
    }

    #[tokio::test]
    async fn single_item_forecast_runs_under_one_deadline() {
        let store = Arc::new(Laggy { inner: seeded_store(), latency: Duration::from_millis(60), only: None });
        let config = PipelineConfig::default().with_item_timeout(Duration::from_millis(100));
        let p = pipeline(store, full_registry(), config);

        // Lookup and aggregation each fit the deadline; together they do not.
        let err = p.forecast_item(ItemRef::Title("Gown".to_string())).await.unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { timeout_ms: 100, .. }));
    }

    #[tokio::test]
    async fn single_item_forecast_by_title_and_id() {
        let store = seeded_store();
        let p = pipeline(store.clone(), full_registry(), PipelineConfig::default());

        let by_title = p.forecast_item(ItemRef::Title("Gown".to_string())).await.unwrap();
        assert_eq!(by_title.forecast.len(), 6);

        let gown = store.find_by_title("Gown").unwrap().unwrap();
        let by_id = p.forecast_item(ItemRef::Id(gown.id)).await.unwrap();
        assert_eq!(by_id, by_title);
    }

    #[tokio::test]
    async fn single_item_without_observations_is_insufficient_data() {
        let p = pipeline(seeded_store(), full_registry(), PipelineConfig::default());
        let err = p.forecast_item(ItemRef::Title("Ventilator".to_string())).await.unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let p = pipeline(seeded_store(), full_registry(), PipelineConfig::default());
        let err = p.forecast_item(ItemRef::Title("Stethoscope".to_string())).await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
        let err = p.resolve(ItemRef::Id(ItemId::new())).await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn explicit_history_overrides_observations() {
        let store = seeded_store();
        let p = pipeline(store.clone(), full_registry(), PipelineConfig::default());
        let gloves = store.find_by_title("Gloves").unwrap().unwrap();

        let history = vec![
            MonthlyAggregate::from_inventory(gloves.id, Month::new(2023, 11).unwrap(), 20.0, 5.0, 5.0).unwrap(),
            MonthlyAggregate::from_inventory(gloves.id, Month::new(2023, 12).unwrap(), 40.0, 5.0, 45.0).unwrap(),
        ];
        let out = p.forecast_with_history(&gloves, history).await.unwrap();
        assert_eq!(out.previous_demand, vec![-10.0, 10.0]);
        assert_eq!(out.forecast, vec![30.0; 6]);
    }

    #[tokio::test]
    async fn monthly_history_is_ascending() {
        let store = seeded_store();
        let p = pipeline(store.clone(), full_registry(), PipelineConfig::default());
        let gown = store.find_by_title("Gown").unwrap().unwrap();
        let months: Vec<String> = p
            .monthly_history(&gown)
            .await
            .unwrap()
            .iter()
            .map(|a| a.month.to_string())
            .collect();
        assert_eq!(months, vec!["2024-01", "2024-04"]);
    }
}
