//! Databricks-style REST client for warehouse listing and statement execution.
//!
//! Statements are submitted with a server-side wait; when the service parks a
//! long statement as PENDING or RUNNING, the client polls the statement
//! resource until it reaches a terminal state or the poll budget runs out.

use super::{StatementExecutor, Warehouse, WarehouseLister};
use crate::config::WarehouseConfig;
use crate::errors::StatsError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

const LIST_WAREHOUSES_PATH: &str = "api/2.0/sql/warehouses";
const STATEMENTS_PATH: &str = "api/2.0/sql/statements";

#[derive(Debug, Deserialize)]
struct WarehouseListing {
    #[serde(default)]
    warehouses: Vec<Warehouse>,
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    statement_id: String,
    status: StatementStatus,
    #[serde(default)]
    result: Option<StatementResult>,
}

#[derive(Debug, Deserialize)]
struct StatementStatus {
    state: String,
    #[serde(default)]
    error: Option<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    data_array: Vec<Vec<Option<String>>>,
}

/// HTTP client for the warehouse REST API.
#[derive(Debug, Clone)]
pub struct DatabricksClient {
    client: Client,
    host: Url,
    token: String,
    wait_timeout: Duration,
    poll_interval: Duration,
    max_polls: u32,
}

impl DatabricksClient {
    pub fn new(config: &WarehouseConfig) -> Self {
        Self {
            client: Client::new(),
            host: config.host.clone(),
            token: config.token.clone(),
            wait_timeout: config.wait_timeout,
            poll_interval: config.poll_interval,
            max_polls: config.max_polls,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, StatsError> {
        self.host
            .join(path)
            .map_err(|e| StatsError::Execution(format!("invalid warehouse URL: {e}")))
    }

    async fn fetch_statement(&self, statement_id: &str) -> Result<StatementResponse, StatsError> {
        let url = self.endpoint(&format!("{STATEMENTS_PATH}/{statement_id}"))?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StatsError::Execution(format!("statement poll failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StatsError::Execution(format!(
                "statement poll returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StatsError::Execution(format!("malformed statement response: {e}")))
    }

    fn finish(&self, response: StatementResponse) -> Result<Option<Vec<Vec<Option<String>>>>, StatsError> {
        match response.status.state.as_str() {
            "SUCCEEDED" => Ok(Some(
                response.result.map(|r| r.data_array).unwrap_or_default(),
            )),
            "PENDING" | "RUNNING" => Ok(None),
            "FAILED" | "CANCELED" | "CLOSED" => {
                let detail = response
                    .status
                    .error
                    .map(|e| e.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| response.status.state.clone());
                Err(StatsError::Execution(format!("statement failed: {detail}")))
            }
            other => Err(StatsError::Execution(format!(
                "statement in unexpected state {other}"
            ))),
        }
    }
}

#[async_trait]
impl WarehouseLister for DatabricksClient {
    async fn list(&self) -> Result<Vec<Warehouse>, StatsError> {
        let url = self.endpoint(LIST_WAREHOUSES_PATH)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StatsError::Execution(format!("warehouse listing failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StatsError::Execution(format!(
                "warehouse listing returned HTTP {}",
                response.status()
            )));
        }

        let listing: WarehouseListing = response
            .json()
            .await
            .map_err(|e| StatsError::Execution(format!("malformed warehouse listing: {e}")))?;
        Ok(listing.warehouses)
    }
}

#[async_trait]
impl StatementExecutor for DatabricksClient {
    async fn execute(
        &self,
        statement: &str,
        warehouse_id: &str,
    ) -> Result<Vec<Vec<Option<String>>>, StatsError> {
        let url = self.endpoint(STATEMENTS_PATH)?;
        let payload = json!({
            "statement": statement,
            "warehouse_id": warehouse_id,
            "wait_timeout": format!("{}s", self.wait_timeout.as_secs()),
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StatsError::Execution(format!("statement submission failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StatsError::Execution(format!(
                "statement submission returned HTTP {}",
                response.status()
            )));
        }

        let submitted: StatementResponse = response
            .json()
            .await
            .map_err(|e| StatsError::Execution(format!("malformed statement response: {e}")))?;

        let statement_id = submitted.statement_id.clone();
        if let Some(rows) = self.finish(submitted)? {
            return Ok(rows);
        }

        for _ in 0..self.max_polls {
            tokio::time::sleep(self.poll_interval).await;
            let polled = self.fetch_statement(&statement_id).await?;
            if let Some(rows) = self.finish(polled)? {
                return Ok(rows);
            }
        }

        Err(StatsError::Execution(format!(
            "statement {statement_id} did not complete within the poll budget"
        )))
    }
}
