//! The planner abstraction and its Ollama-backed implementation.
//!
//! A planner proposes one step at a time: given the rendered prompt it returns
//! raw text for [`protocol::parse`] to interpret. Anything that can speak this
//! contract can drive the loop; tests use scripted planners.
//!
//! [`protocol::parse`]: super::protocol::parse

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AgentConfig;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("planner request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("planner returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("planner returned an empty response")]
    Empty,
}

#[async_trait]
pub trait Planner: Send + Sync {
    /// Propose the next step for the rendered prompt.
    async fn propose(&self, prompt: &str) -> Result<String, PlannerError>;
}

/// Planner backed by a local Ollama chat endpoint.
pub struct OllamaPlanner {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    /// Cut generation before the model hallucinates an observation.
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaPlanner {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl Planner for OllamaPlanner {
    async fn propose(&self, prompt: &str) -> Result<String, PlannerError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
                stop: vec!["\nObservation".to_string()],
            },
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlannerError::Status(status));
        }

        let body: ChatResponse = response.json().await?;
        let content = body.message.content.trim().to_string();
        if content.is_empty() {
            return Err(PlannerError::Empty);
        }
        Ok(content)
    }
}
