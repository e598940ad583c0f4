use std::sync::Arc;

use async_trait::async_trait;

use super::Tool;
use crate::knowledge::KnowledgeIndex;

/// Fixed answer when the index could not be built or loaded.
pub const NO_KNOWLEDGE: &str = "No weather knowledge data available.";

/// Fixed answer when a query matches nothing.
pub const NO_RESULTS: &str = "No relevant weather knowledge found.";

/// Similarity search over the climate PDF corpus. Holds `None` when the index
/// was unavailable at startup; all queries then return [`NO_KNOWLEDGE`].
pub struct KnowledgeSearchTool {
    index: Option<Arc<KnowledgeIndex>>,
    top_k: usize,
}

impl KnowledgeSearchTool {
    pub fn new(index: Option<Arc<KnowledgeIndex>>, top_k: usize) -> Self {
        Self { index, top_k }
    }
}

#[async_trait]
impl Tool for KnowledgeSearchTool {
    fn name(&self) -> &str {
        "search_weather_knowledge"
    }

    fn description(&self) -> &str {
        "takes a question as input and returns relevant climate and weather knowledge \
         from the document corpus"
    }

    async fn call(&self, input: &str) -> String {
        let Some(index) = self.index.clone() else {
            return NO_KNOWLEDGE.to_string();
        };

        let query = input.trim().to_string();
        let top_k = self.top_k;
        // Embedding is CPU-bound, keep it off the async runtime.
        let result = tokio::task::spawn_blocking(move || index.query(&query, top_k)).await;

        match result {
            Ok(Ok(chunks)) if chunks.is_empty() => NO_RESULTS.to_string(),
            Ok(Ok(chunks)) => chunks.join("\n"),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "knowledge query failed");
                format!("Error searching weather knowledge: {err}")
            }
            Err(err) => {
                tracing::warn!(error = %err, "knowledge query task failed");
                format!("Error searching weather knowledge: {err}")
            }
        }
    }
}
