#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use skycast::agent::planner::{Planner, PlannerError};
use skycast::config::AgentConfig;
use skycast::embedding::{EmbeddingProvider, EMBEDDING_DIM};
use skycast::knowledge::{self, KnowledgeIndex};
use skycast::tools::Tool;

/// Planner that replays a fixed sequence of outputs and records every prompt
/// it was given. Runs dry with `PlannerError::Empty`.
pub struct ScriptedPlanner {
    outputs: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedPlanner {
    pub fn new(outputs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(outputs.iter().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn propose(&self, prompt: &str) -> Result<String, PlannerError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(PlannerError::Empty)
    }
}

/// Planner that returns the same output forever — used to exhaust the budget.
pub struct RepeatPlanner {
    output: String,
}

impl RepeatPlanner {
    pub fn new(output: &str) -> Arc<Self> {
        Arc::new(Self {
            output: output.to_string(),
        })
    }
}

#[async_trait]
impl Planner for RepeatPlanner {
    async fn propose(&self, _prompt: &str) -> Result<String, PlannerError> {
        Ok(self.output.clone())
    }
}

/// Planner whose backend is always unreachable.
pub struct FailingPlanner;

#[async_trait]
impl Planner for FailingPlanner {
    async fn propose(&self, _prompt: &str) -> Result<String, PlannerError> {
        Err(PlannerError::Empty)
    }
}

/// Tool that echoes its input and counts invocations.
#[derive(Default)]
pub struct CountingEchoTool {
    pub calls: AtomicUsize,
}

impl CountingEchoTool {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for CountingEchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "echoes its input back"
    }
    async fn call(&self, input: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        format!("echo: {input}")
    }
}

/// Tool whose output is an error sentence — the loop must treat it as any
/// other observation.
pub struct ApologeticTool;

#[async_trait]
impl Tool for ApologeticTool {
    fn name(&self) -> &str {
        "broken"
    }
    fn description(&self) -> &str {
        "always fails politely"
    }
    async fn call(&self, _input: &str) -> String {
        "Sorry, I couldn't retrieve the weather data at this time.".to_string()
    }
}

pub fn agent_config() -> AgentConfig {
    AgentConfig {
        max_iterations: 5,
        history_window: 4,
        ..AgentConfig::default()
    }
}

/// Deterministic embedder: a unit spike at the text's first byte. Identical
/// texts map to identical vectors; texts with different leading characters are
/// orthogonal.
pub struct SpikeEmbedder;

impl EmbeddingProvider for SpikeEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        let position = text.as_bytes().first().copied().unwrap_or(0) as usize;
        v[position % EMBEDDING_DIM] = 1.0;
        Ok(v)
    }
}

/// Embedder producing the wrong number of dimensions, to exercise validation.
pub struct BadDimEmbedder;

impl EmbeddingProvider for BadDimEmbedder {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![0.0; 3])
    }
}

/// Fresh in-memory knowledge index over the given embedder.
pub fn test_index(embedder: Arc<dyn EmbeddingProvider>) -> KnowledgeIndex {
    knowledge::load_sqlite_vec();
    let conn = Connection::open_in_memory().unwrap();
    knowledge::init_schema(&conn).unwrap();
    KnowledgeIndex::from_connection(conn, embedder)
}
