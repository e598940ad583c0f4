//! Callable tools exposed to the agent.
//!
//! Every tool takes one string and returns one string, since the planner only
//! consumes text. Tools are failure-isolated: any internal error becomes an
//! apologetic sentence, never an `Err` that could abort the agent turn.

pub mod current_weather;
pub mod date_time;
pub mod forecast_weather;
pub mod knowledge_search;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

pub use current_weather::CurrentWeatherTool;
pub use date_time::DateTimeTool;
pub use forecast_weather::ForecastWeatherTool;
pub use knowledge_search::KnowledgeSearchTool;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique identifier the planner uses in `Action:` lines.
    fn name(&self) -> &str;

    /// One-sentence description the planner uses to select the tool.
    fn description(&self) -> &str;

    /// Invoke the tool. Must return plain text in every case, including
    /// internal failures.
    async fn call(&self, input: &str) -> String;
}

/// The fixed set of tools visible to the agent. Names are unique.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        for (i, tool) in tools.iter().enumerate() {
            if tools[..i].iter().any(|t| t.name() == tool.name()) {
                anyhow::bail!("duplicate tool name: {}", tool.name());
            }
        }
        Ok(Self { tools })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// `name: description` lines for the prompt's tool listing.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
