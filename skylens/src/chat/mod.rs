//! Conversational assistant: prompt construction, agent invocation, reply
//! normalization.

pub mod normalize;

use crate::config::Config;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// Invokes the hosted conversational agent with a raw payload.
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn invoke(&self, payload: Value) -> anyhow::Result<Value>;
}

/// Reqwest-based client for a serving endpoint's invocations API.
#[derive(Debug, Clone)]
pub struct ServingEndpointClient {
    client: Client,
    host: Url,
    token: String,
    endpoint_name: String,
}

impl ServingEndpointClient {
    pub fn new(host: Url, token: String, endpoint_name: String) -> Self {
        Self {
            client: Client::new(),
            host,
            token,
            endpoint_name,
        }
    }
}

#[async_trait]
impl AgentClient for ServingEndpointClient {
    async fn invoke(&self, payload: Value) -> anyhow::Result<Value> {
        let url = self
            .host
            .join(&format!("serving-endpoints/{}/invocations", self.endpoint_name))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("serving endpoint returned HTTP {status}");
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: Uuid,
}

/// Forwards user questions to the agent and normalizes its replies.
pub struct ChatService {
    agent: Arc<dyn AgentClient>,
    catalog: String,
    schema: String,
}

impl ChatService {
    pub fn new(agent: Arc<dyn AgentClient>, config: &Config) -> Self {
        Self {
            agent,
            catalog: config.warehouse.catalog.clone(),
            schema: config.warehouse.schema.clone(),
        }
    }

    /// Handle one chat turn. Session ids are opaque: minted when absent,
    /// echoed back, never validated against any store.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        if request.message.is_empty() {
            return Err(Error::bad_request("Message is required"));
        }

        let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);

        let payload = json!({
            "dataframe_records": [{
                "input": [
                    {"role": "system", "content": self.system_prompt()},
                    {"role": "user", "content": request.message},
                ]
            }]
        });

        let raw = self
            .agent
            .invoke(payload)
            .await
            .map_err(|e| Error::Agent(format!("{e:#}")))?;

        Ok(ChatResponse {
            response: normalize::normalize(&raw),
            session_id,
        })
    }

    /// Mint a fresh session id, discarding whatever the client held.
    pub fn clear_session(&self) -> Uuid {
        Uuid::new_v4()
    }

    fn system_prompt(&self) -> String {
        let qualified = |table: &str| format!("{}.{}.{table}", self.catalog, self.schema);
        format!(
            "You are an intelligent assistant for a travel marketplace intelligence hub.\n\
             You have access to data about Flights, Hotels, Packages, and Customer Reviews.\n\
             \n\
             The data is stored in Delta tables:\n\
             - {flights}\n\
             - {hotels}\n\
             - {packages}\n\
             - {reviews}\n\
             \n\
             You can help users:\n\
             1. Search and analyze flight data (airlines, prices, routes, availability)\n\
             2. Find and compare hotel information (locations, ratings, amenities, prices)\n\
             3. Browse travel packages (destinations, inclusions, pricing, availability)\n\
             4. Review customer feedback and sentiment analysis\n\
             5. Generate insights and recommendations based on the data\n\
             \n\
             Always be helpful, accurate, and provide data-driven insights when possible.\n\
             Use SQL queries against the Delta tables to retrieve relevant information.",
            flights = qualified("flights"),
            hotels = qualified("hotels"),
            packages = qualified("packages"),
            reviews = qualified("reviews"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingAgent {
        reply: Value,
        last_payload: Mutex<Option<Value>>,
    }

    impl RecordingAgent {
        fn new(reply: Value) -> Self {
            Self {
                reply,
                last_payload: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl AgentClient for RecordingAgent {
        async fn invoke(&self, payload: Value) -> anyhow::Result<Value> {
            *self.last_payload.lock().unwrap() = Some(payload);
            Ok(self.reply.clone())
        }
    }

    fn service(agent: Arc<dyn AgentClient>) -> ChatService {
        ChatService::new(agent, &Config::default())
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let agent = Arc::new(RecordingAgent::new(json!({})));
        let err = service(agent)
            .chat(ChatRequest {
                message: String::new(),
                session_id: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn session_id_is_minted_when_absent_and_echoed_when_present() {
        let agent = Arc::new(RecordingAgent::new(json!({"content": "hi"})));
        let svc = service(agent);

        let minted = svc
            .chat(ChatRequest {
                message: "hello".to_string(),
                session_id: None,
            })
            .await
            .unwrap();

        let fixed = Uuid::new_v4();
        let echoed = svc
            .chat(ChatRequest {
                message: "hello again".to_string(),
                session_id: Some(fixed),
            })
            .await
            .unwrap();

        assert_ne!(minted.session_id, echoed.session_id);
        assert_eq!(echoed.session_id, fixed, "provided session id should echo back");
    }

    #[tokio::test]
    async fn payload_wraps_prompt_in_dataframe_records() {
        let agent = Arc::new(RecordingAgent::new(json!({"content": "ok"})));
        let svc = service(agent.clone());
        svc.chat(ChatRequest {
            message: "cheapest flights to Tokyo?".to_string(),
            session_id: None,
        })
        .await
        .unwrap();

        let payload = agent.last_payload.lock().unwrap().clone().unwrap();
        let input = &payload["dataframe_records"][0]["input"];
        assert_eq!(input[0]["role"], "system");
        assert!(
            input[0]["content"]
                .as_str()
                .unwrap()
                .contains("users.travel_intel.flights"),
            "system prompt should name the qualified tables"
        );
        assert_eq!(input[1]["content"], "cheapest flights to Tokyo?");
    }

    #[tokio::test]
    async fn agent_reply_is_normalized() {
        let agent = Arc::new(RecordingAgent::new(json!({
            "choices": [{"message": {"content": "Hi there"}}]
        })));
        let reply = service(agent)
            .chat(ChatRequest {
                message: "hi".to_string(),
                session_id: None,
            })
            .await
            .unwrap();
        assert_eq!(reply.response, "Hi there");
    }
}
