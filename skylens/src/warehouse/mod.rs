//! SQL warehouse selection and the execution seams.
//!
//! The aggregation service talks to the warehouse API through two traits so
//! tests can substitute in-memory fakes. Production impls live in [`client`].

pub mod client;

pub use client::DatabricksClient;

use crate::errors::StatsError;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// A SQL warehouse as reported by the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Warehouse {
    pub id: String,
    pub state: WarehouseState,
}

/// Warehouse lifecycle state. Only `Running` is eligible for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarehouseState {
    Running,
    Starting,
    Stopped,
    Stopping,
    Deleting,
    Deleted,
    #[serde(other)]
    Unknown,
}

/// Lists the account's SQL warehouses.
#[async_trait]
pub trait WarehouseLister: Send + Sync {
    async fn list(&self) -> Result<Vec<Warehouse>, StatsError>;
}

/// Executes one SQL statement and returns its rows as nullable string cells.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(
        &self,
        statement: &str,
        warehouse_id: &str,
    ) -> Result<Vec<Vec<Option<String>>>, StatsError>;
}

/// Picks the warehouse every statement runs on.
///
/// A configured id always wins, without listing or state checks; the operator
/// is trusted to point at a live warehouse. Otherwise the first RUNNING
/// warehouse in listing order is used. One attempt, no retry.
pub struct WarehouseResolver {
    configured_id: Option<String>,
    lister: Arc<dyn WarehouseLister>,
}

impl WarehouseResolver {
    pub fn new(configured_id: Option<String>, lister: Arc<dyn WarehouseLister>) -> Self {
        Self {
            configured_id,
            lister,
        }
    }

    pub async fn resolve(&self) -> Result<String, StatsError> {
        if let Some(id) = &self.configured_id {
            return Ok(id.clone());
        }

        let warehouses = self.lister.list().await?;
        warehouses
            .into_iter()
            .find(|w| w.state == WarehouseState::Running)
            .map(|w| w.id)
            .ok_or(StatsError::NoWarehouseAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedLister {
        warehouses: Vec<Warehouse>,
        calls: AtomicUsize,
    }

    impl FixedLister {
        fn new(warehouses: Vec<Warehouse>) -> Self {
            Self {
                warehouses,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WarehouseLister for FixedLister {
        async fn list(&self) -> Result<Vec<Warehouse>, StatsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.warehouses.clone())
        }
    }

    fn warehouse(id: &str, state: WarehouseState) -> Warehouse {
        Warehouse {
            id: id.to_string(),
            state,
        }
    }

    #[tokio::test]
    async fn configured_id_wins_without_listing() {
        let lister = Arc::new(FixedLister::new(vec![]));
        let resolver = WarehouseResolver::new(Some("abc123".to_string()), lister.clone());
        assert_eq!(resolver.resolve().await.unwrap(), "abc123");
        assert_eq!(
            lister.calls.load(Ordering::SeqCst),
            0,
            "configured id should skip the listing call"
        );
    }

    #[tokio::test]
    async fn first_running_warehouse_in_listing_order() {
        let lister = Arc::new(FixedLister::new(vec![
            warehouse("w1", WarehouseState::Stopped),
            warehouse("w2", WarehouseState::Running),
            warehouse("w3", WarehouseState::Running),
        ]));
        let resolver = WarehouseResolver::new(None, lister);
        assert_eq!(resolver.resolve().await.unwrap(), "w2");
    }

    #[tokio::test]
    async fn no_running_warehouse_is_an_error() {
        let lister = Arc::new(FixedLister::new(vec![
            warehouse("w1", WarehouseState::Stopped),
            warehouse("w2", WarehouseState::Starting),
        ]));
        let resolver = WarehouseResolver::new(None, lister);
        assert_eq!(
            resolver.resolve().await.unwrap_err(),
            StatsError::NoWarehouseAvailable
        );
    }

    #[test]
    fn unrecognized_state_deserializes_as_unknown() {
        let w: Warehouse =
            serde_json::from_str(r#"{"id":"w9","state":"DEGRADED"}"#).unwrap();
        assert_eq!(w.state, WarehouseState::Unknown);
    }
}
