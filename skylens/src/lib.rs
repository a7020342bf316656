//! Travel marketplace intelligence backend.
//!
//! Serves per-domain statistics snapshots computed from a Databricks-style SQL
//! warehouse, briefly cached and degraded to synthetic data when the warehouse
//! is unreachable, plus a conversational assistant proxied through a serving
//! endpoint.
//!
//! ## Architecture
//!
//! - [`stats`] owns aggregation: query composition, statement execution,
//!   result decoding, the TTL cache, and the fallback snapshots.
//! - [`warehouse`] owns warehouse selection and the REST client.
//! - [`chat`] owns prompt construction and reply normalization.
//! - [`api`] owns the axum handlers; [`build_router`] wires them together.

pub mod api;
pub mod chat;
pub mod config;
pub mod errors;
pub mod stats;
pub mod telemetry;
pub mod warehouse;

use crate::chat::{ChatService, ServingEndpointClient};
use crate::config::Config;
use crate::stats::StatsService;
use crate::stats::queries::QueryComposer;
use crate::warehouse::{DatabricksClient, WarehouseResolver};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stats: Arc<StatsService>,
    pub chat: Arc<ChatService>,
}

/// Build the API router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/{domain}/stats", get(api::handlers::stats::domain_stats))
        .route("/api/stats", get(api::handlers::stats::catalog_counts))
        .route("/api/chat", post(api::handlers::chat::chat))
        .route("/api/clear", post(api::handlers::chat::clear))
        .route("/api/insights", post(api::handlers::insights::insights))
        .route("/health", get(api::handlers::stats::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The assembled application, ready to serve.
pub struct Application {
    router: Router,
    config: Arc<Config>,
}

impl Application {
    /// Wire up clients and services from configuration.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let warehouse_client = Arc::new(DatabricksClient::new(&config.warehouse));
        let resolver = WarehouseResolver::new(
            config.warehouse.warehouse_id.clone(),
            warehouse_client.clone(),
        );
        let composer = QueryComposer::new(
            config.warehouse.catalog.clone(),
            config.warehouse.schema.clone(),
        );
        let stats = Arc::new(StatsService::new(
            config.stats.freshness_window,
            resolver,
            warehouse_client,
            composer,
        ));

        let agent = Arc::new(ServingEndpointClient::new(
            config.agent_host().clone(),
            config.warehouse.token.clone(),
            config.agent.endpoint_name.clone(),
        ));
        let chat = Arc::new(ChatService::new(agent, &config));

        let state = AppState {
            config: config.clone(),
            stats,
            chat,
        };

        Self {
            router: build_router(state),
            config,
        }
    }

    /// Bind and serve until the shutdown future resolves.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Intelligence hub listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::AgentClient;
    use crate::errors::StatsError;
    use crate::warehouse::{StatementExecutor, Warehouse, WarehouseLister};
    use async_trait::async_trait;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    struct NoWarehouses;

    #[async_trait]
    impl WarehouseLister for NoWarehouses {
        async fn list(&self) -> Result<Vec<Warehouse>, StatsError> {
            Ok(vec![])
        }
    }

    struct NoopExecutor;

    #[async_trait]
    impl StatementExecutor for NoopExecutor {
        async fn execute(
            &self,
            _statement: &str,
            _warehouse_id: &str,
        ) -> Result<Vec<Vec<Option<String>>>, StatsError> {
            Ok(vec![])
        }
    }

    struct OneRunningWarehouse;

    #[async_trait]
    impl WarehouseLister for OneRunningWarehouse {
        async fn list(&self) -> Result<Vec<Warehouse>, StatsError> {
            Ok(vec![Warehouse {
                id: "w1".to_string(),
                state: crate::warehouse::WarehouseState::Running,
            }])
        }
    }

    struct CountingExecutor {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl StatementExecutor for CountingExecutor {
        async fn execute(
            &self,
            _statement: &str,
            _warehouse_id: &str,
        ) -> Result<Vec<Vec<Option<String>>>, StatsError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(vec![])
        }
    }

    struct EchoAgent;

    #[async_trait]
    impl AgentClient for EchoAgent {
        async fn invoke(&self, _payload: Value) -> anyhow::Result<Value> {
            Ok(json!({"content": "echo"}))
        }
    }

    fn test_server() -> TestServer {
        let config = Arc::new(Config::default());
        let resolver = WarehouseResolver::new(None, Arc::new(NoWarehouses));
        let stats = Arc::new(StatsService::new(
            config.stats.freshness_window,
            resolver,
            Arc::new(NoopExecutor),
            QueryComposer::new("users", "travel_intel"),
        ));
        let chat = Arc::new(ChatService::new(Arc::new(EchoAgent), &config));
        let state = AppState {
            config,
            stats,
            chat,
        };
        TestServer::new(build_router(state)).expect("router should build")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn stats_endpoint_is_200_even_without_a_warehouse() {
        let server = test_server();
        let response = server.get("/api/flights/stats").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body["airlines"].as_array().map(Vec::len),
            Some(5),
            "outage should serve the synthetic airline list"
        );
        assert!(body["error"].is_string(), "fallback carries an error field");
        let cache_control = response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(cache_control.contains("max-age=600"));
    }

    #[tokio::test]
    async fn unknown_domain_is_a_client_error() {
        let server = test_server();
        let response = server.get("/api/cruises/stats").await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn catalog_counts_are_fixed() {
        let server = test_server();
        let body: Value = server.get("/api/stats").await.json();
        assert_eq!(body["flights"], 1000);
        assert_eq!(body["reviews"], 800);
    }

    #[tokio::test]
    async fn chat_round_trips_and_mints_a_session() {
        let server = test_server();
        let response = server
            .post("/api/chat")
            .json(&json!({"message": "hello"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["response"], "echo");
        assert!(body["session_id"].is_string());
    }

    #[tokio::test]
    async fn empty_chat_message_is_rejected() {
        let server = test_server();
        let response = server.post("/api/chat").json(&json!({"message": ""})).await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Message is required");
    }

    #[tokio::test]
    async fn insights_reject_malformed_attributes() {
        let server = test_server();
        let response = server
            .post("/api/insights")
            .json(&json!({"attribute": "not-a-table-column"}))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn clear_mints_a_new_session() {
        let server = test_server();
        let response = server.post("/api/clear").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Session cleared successfully");
        assert!(body["session_id"].is_string());
    }

    #[tokio::test]
    async fn clear_leaves_cached_snapshots_intact() {
        let config = Arc::new(Config::default());
        let executor = Arc::new(CountingExecutor {
            calls: std::sync::atomic::AtomicUsize::new(0),
        });
        let resolver = WarehouseResolver::new(None, Arc::new(OneRunningWarehouse));
        let stats = Arc::new(StatsService::new(
            config.stats.freshness_window,
            resolver,
            executor.clone(),
            QueryComposer::new("users", "travel_intel"),
        ));
        let chat = Arc::new(ChatService::new(Arc::new(EchoAgent), &config));
        let server = TestServer::new(build_router(AppState {
            config,
            stats,
            chat,
        }))
        .expect("router should build");

        server.get("/api/flights/stats").await.assert_status_ok();
        let calls_after_first = executor.calls.load(std::sync::atomic::Ordering::SeqCst);

        server.post("/api/clear").await.assert_status_ok();
        server.get("/api/flights/stats").await.assert_status_ok();

        assert_eq!(
            executor.calls.load(std::sync::atomic::Ordering::SeqCst),
            calls_after_first,
            "session reset must not evict snapshot cache entries"
        );
    }
}
