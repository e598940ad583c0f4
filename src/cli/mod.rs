//! One-shot CLI commands: model download, index rebuild, and terminal Q&A.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;

use crate::agent::planner::OllamaPlanner;
use crate::agent::{AgentExecutor, ChatSession};
use crate::config::SkycastConfig;
use crate::embedding;
use crate::knowledge::KnowledgeIndex;
use crate::tools::{
    CurrentWeatherTool, DateTimeTool, ForecastWeatherTool, KnowledgeSearchTool, Tool, ToolRegistry,
};
use crate::weather::WeatherClient;

const MODEL_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Download the ONNX embedding model and tokenizer to the cache directory.
pub async fn model_download(config: &crate::config::EmbeddingConfig) -> Result<()> {
    let cache_dir = crate::config::expand_tilde(&config.cache_dir);
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("failed to create cache dir: {}", cache_dir.display()))?;

    let model_path = cache_dir.join("model.onnx");
    let tokenizer_path = cache_dir.join("tokenizer.json");

    if model_path.exists() {
        println!("Model already exists at {}", model_path.display());
    } else {
        println!("Downloading model.onnx (~90MB)...");
        download_file(MODEL_URL, &model_path).await?;
        println!("Model saved to {}", model_path.display());
    }

    if tokenizer_path.exists() {
        println!("Tokenizer already exists at {}", tokenizer_path.display());
    } else {
        println!("Downloading tokenizer.json...");
        download_file(TOKENIZER_URL, &tokenizer_path).await?;
        println!("Tokenizer saved to {}", tokenizer_path.display());
    }

    println!("Model download complete. Ready for use.");
    Ok(())
}

/// Download a file from a URL with progress bar. Uses atomic write (tmp + rename).
async fn download_file(url: &str, dest: &PathBuf) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("HTTP request failed for {url}"))?;

    anyhow::ensure!(
        response.status().is_success(),
        "download failed with HTTP {}",
        response.status()
    );

    let total_size = response.content_length();
    let pb = if let Some(size) = total_size {
        let pb = ProgressBar::new(size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
                .expect("valid template")
                .progress_chars("##-"),
        );
        pb
    } else {
        ProgressBar::new_spinner()
    };

    let tmp_path = dest.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

    let bytes = response.bytes().await.context("error reading response")?;
    pb.inc(bytes.len() as u64);
    file.write_all(&bytes)
        .await
        .context("error writing to file")?;

    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, dest)
        .await
        .context("failed to rename temp file")?;

    pb.finish_and_clear();
    Ok(())
}

/// Delete the persisted knowledge index and rebuild it from the PDF corpus.
pub async fn index_rebuild(config: &SkycastConfig) -> Result<()> {
    let provider = embedding::create_provider(&config.embedding)?;
    let knowledge = config.knowledge.clone();

    println!("Rebuilding knowledge index from {}...", knowledge.corpus_dir);
    let index = tokio::task::spawn_blocking(move || {
        KnowledgeIndex::rebuild(&knowledge, Arc::from(provider))
    })
    .await
    .context("rebuild task failed")??;

    println!(
        "Knowledge index rebuilt: {} chunks at {}",
        index.len()?,
        config.resolved_index_path().display()
    );
    Ok(())
}

/// Answer one question from the terminal, without the HTTP server.
pub async fn ask(config: &SkycastConfig, question: &str) -> Result<()> {
    let weather = WeatherClient::new(&config.weather);

    let knowledge = match embedding::create_provider(&config.embedding) {
        Ok(provider) => {
            KnowledgeIndex::open_or_build(&config.knowledge, Arc::from(provider)).map(Arc::new)
        }
        Err(err) => {
            tracing::warn!(error = %err, "embedding provider unavailable, knowledge search disabled");
            None
        }
    };

    let tools = ToolRegistry::new(vec![
        Arc::new(CurrentWeatherTool::new(weather.clone())) as Arc<dyn Tool>,
        Arc::new(ForecastWeatherTool::new(weather.clone())),
        Arc::new(DateTimeTool::new(weather)),
        Arc::new(KnowledgeSearchTool::new(knowledge, config.knowledge.top_k)),
    ])?;

    let planner = Arc::new(OllamaPlanner::new(&config.agent));
    let agent = AgentExecutor::new(planner, tools, &config.agent);
    let mut session = ChatSession::new(config.agent.history_window);

    let answer = agent.run_turn(&mut session, question).await;
    println!("{answer}");
    Ok(())
}
