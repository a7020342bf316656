use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

/// Failures below the aggregation service.
///
/// These never escape to statistics callers; the service converts them into
/// fallback snapshots. The chat and insights paths surface them instead.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// No configured warehouse and no RUNNING warehouse in the listing.
    #[error("No running SQL warehouse available")]
    NoWarehouseAvailable,

    /// Statement submission, polling, or transport failure.
    #[error("{0}")]
    Execution(String),
}

/// HTTP-facing error for the endpoints that do surface failures.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Warehouse-side failure on a path with no synthetic substitute
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Conversational agent invocation failure
    #[error("Failed to reach the assistant: {0}")]
    Agent(String),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Stats(StatsError::NoWarehouseAvailable) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Stats(StatsError::Execution(_)) => StatusCode::BAD_GATEWAY,
            Error::Agent(_) => StatusCode::BAD_GATEWAY,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::Stats(err) => err.to_string(),
            Error::Agent(_) => "The assistant is currently unavailable".to_string(),
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full details here; the response body carries only the safe message.
        match &self {
            Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Stats(_) | Error::Agent(_) => {
                tracing::warn!("Upstream error: {}", self);
            }
            Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = json!({ "error": self.user_message() });
        (status, axum::response::Json(body)).into_response()
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_by_variant() {
        assert_eq!(
            Error::bad_request("message is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Stats(StatsError::NoWarehouseAvailable).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::Agent("boom".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn agent_failures_do_not_leak_details() {
        let err = Error::Agent("token leaked into message".to_string());
        assert!(
            !err.user_message().contains("token"),
            "user message should hide upstream detail"
        );
    }
}
