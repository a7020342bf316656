//! Statistics aggregation: compose, execute, decode, cache, degrade.

pub mod cache;
pub mod decode;
pub mod domain;
pub mod fallback;
pub mod insights;
pub mod queries;

pub use domain::{Snapshot, StatsDomain};

use crate::errors::{Error, Result, StatsError};
use crate::warehouse::{StatementExecutor, WarehouseResolver};
use cache::StatsCache;
use insights::{InsightsQuery, InsightsRequest, InsightsResponse};
use queries::QueryComposer;
use std::sync::Arc;
use std::time::Duration;

/// Serves domain snapshots, masking every warehouse failure behind synthetic
/// data.
pub struct StatsService {
    cache: StatsCache,
    resolver: WarehouseResolver,
    executor: Arc<dyn StatementExecutor>,
    composer: QueryComposer,
}

impl StatsService {
    pub fn new(
        freshness_window: Duration,
        resolver: WarehouseResolver,
        executor: Arc<dyn StatementExecutor>,
        composer: QueryComposer,
    ) -> Self {
        Self {
            cache: StatsCache::new(freshness_window),
            resolver,
            executor,
            composer,
        }
    }

    /// Current snapshot for a domain. Infallible: any failure below this
    /// point becomes a fallback snapshot, logged but never surfaced.
    pub async fn get_stats(&self, domain: StatsDomain) -> Snapshot {
        if let Some(snapshot) = self.cache.get(domain).await {
            return snapshot;
        }

        match self.compute(domain).await {
            Ok(snapshot) => {
                self.cache.put(domain, snapshot.clone()).await;
                snapshot
            }
            Err(err) => {
                tracing::error!(%domain, error = %err, "statistics computation failed, serving fallback");
                fallback::fallback(domain, &err)
            }
        }
    }

    /// One full remote round trip for a domain.
    async fn compute(&self, domain: StatsDomain) -> std::result::Result<Snapshot, StatsError> {
        let warehouse_id = self.resolver.resolve().await?;

        let statements = self.composer.compose(domain);
        let mut results = Vec::with_capacity(statements.len());
        for statement in &statements {
            results.push(self.executor.execute(statement, &warehouse_id).await?);
        }

        Ok(decode::decode(domain, &results))
    }

    /// Filtered single-attribute insights. No fallback here; failures surface.
    pub async fn insights(&self, request: InsightsRequest) -> Result<InsightsResponse> {
        let query = InsightsQuery::parse(request)?;
        let warehouse_id = self.resolver.resolve().await.map_err(Error::Stats)?;
        let table = self.composer.table(query.domain);

        let distribution = self
            .executor
            .execute(&query.distribution_statement(&table), &warehouse_id)
            .await
            .map_err(Error::Stats)?;
        let totals = self
            .executor
            .execute(&query.totals_statement(&table), &warehouse_id)
            .await
            .map_err(Error::Stats)?;

        Ok(query.decode(&distribution, &totals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::{Warehouse, WarehouseLister, WarehouseState};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EmptyLister;

    #[async_trait]
    impl WarehouseLister for EmptyLister {
        async fn list(&self) -> std::result::Result<Vec<Warehouse>, StatsError> {
            Ok(vec![])
        }
    }

    struct RunningLister;

    #[async_trait]
    impl WarehouseLister for RunningLister {
        async fn list(&self) -> std::result::Result<Vec<Warehouse>, StatsError> {
            Ok(vec![Warehouse {
                id: "w1".to_string(),
                state: WarehouseState::Running,
            }])
        }
    }

    /// Returns empty result sets and counts execute calls.
    struct CountingExecutor {
        calls: AtomicUsize,
    }

    impl CountingExecutor {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StatementExecutor for CountingExecutor {
        async fn execute(
            &self,
            _statement: &str,
            _warehouse_id: &str,
        ) -> std::result::Result<Vec<Vec<Option<String>>>, StatsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    struct FailingExecutor;

    #[async_trait]
    impl StatementExecutor for FailingExecutor {
        async fn execute(
            &self,
            _statement: &str,
            _warehouse_id: &str,
        ) -> std::result::Result<Vec<Vec<Option<String>>>, StatsError> {
            Err(StatsError::Execution("connection refused".to_string()))
        }
    }

    fn service(
        window: Duration,
        lister: Arc<dyn WarehouseLister>,
        executor: Arc<dyn StatementExecutor>,
    ) -> StatsService {
        StatsService::new(
            window,
            WarehouseResolver::new(None, lister),
            executor,
            QueryComposer::new("users", "travel_intel"),
        )
    }

    #[tokio::test]
    async fn second_call_within_window_serves_the_cache() {
        let executor = Arc::new(CountingExecutor::new());
        let svc = service(
            Duration::from_secs(600),
            Arc::new(RunningLister),
            executor.clone(),
        );

        let first = svc.get_stats(StatsDomain::Flights).await;
        let calls_after_first = executor.calls.load(Ordering::SeqCst);
        let second = svc.get_stats(StatsDomain::Flights).await;

        assert_eq!(first, second, "cached snapshot should be identical");
        assert_eq!(
            executor.calls.load(Ordering::SeqCst),
            calls_after_first,
            "second call within the window should not touch the executor"
        );
    }

    #[tokio::test]
    async fn elapsed_window_triggers_one_recomputation() {
        let executor = Arc::new(CountingExecutor::new());
        let svc = service(
            Duration::from_millis(20),
            Arc::new(RunningLister),
            executor.clone(),
        );

        svc.get_stats(StatsDomain::Hotels).await;
        let calls_after_first = executor.calls.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(40)).await;
        svc.get_stats(StatsDomain::Hotels).await;

        assert_eq!(
            executor.calls.load(Ordering::SeqCst),
            calls_after_first * 2,
            "stale entry should trigger exactly one fresh round trip"
        );
    }

    #[tokio::test]
    async fn no_warehouse_yields_flights_fallback_with_error() {
        let svc = service(
            Duration::from_secs(600),
            Arc::new(EmptyLister),
            Arc::new(CountingExecutor::new()),
        );

        let Snapshot::Flights(stats) = svc.get_stats(StatsDomain::Flights).await else {
            panic!("flights request should yield a flights snapshot");
        };
        let error = stats.error.as_deref().unwrap_or_default();
        assert!(!error.is_empty(), "fallback must carry a failure description");
        assert_eq!(stats.airlines.len(), 5, "fallback airline list is fixed");
    }

    #[tokio::test]
    async fn fallback_is_never_cached() {
        let svc = service(
            Duration::from_secs(600),
            Arc::new(EmptyLister),
            Arc::new(CountingExecutor::new()),
        );

        svc.get_stats(StatsDomain::Reviews).await;
        let again = svc.get_stats(StatsDomain::Reviews).await;
        assert!(
            again.error().is_some(),
            "second call during an outage should recompute the fallback, not a cache hit"
        );
        assert!(svc.cache.get(StatsDomain::Reviews).await.is_none());
    }

    #[tokio::test]
    async fn executor_failure_degrades_to_fallback() {
        let svc = service(
            Duration::from_secs(600),
            Arc::new(RunningLister),
            Arc::new(FailingExecutor),
        );

        let snapshot = svc.get_stats(StatsDomain::Packages).await;
        let error = snapshot.error().unwrap_or_default();
        assert!(
            error.contains("connection refused"),
            "fallback error should describe the failure, got {error:?}"
        );
    }

    #[tokio::test]
    async fn insights_surface_warehouse_failures() {
        let svc = service(
            Duration::from_secs(600),
            Arc::new(EmptyLister),
            Arc::new(CountingExecutor::new()),
        );

        let err = svc
            .insights(InsightsRequest {
                attribute: "flights.airline".to_string(),
                company_name: String::new(),
                start_date: String::new(),
                end_date: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "insights have no synthetic substitute"
        );
    }
}
