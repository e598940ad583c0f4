use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SkycastConfig {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub speech: SpeechConfig,
    pub agent: AgentConfig,
    pub knowledge: KnowledgeConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Empty means the weather features degrade to
    /// their sentinel error strings.
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speechify API key. Empty means synthesis is unavailable (returns None).
    pub api_key: String,
    pub base_url: String,
    pub default_voice: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub ollama_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_iterations: usize,
    /// Number of user/assistant exchanges kept in the sliding history window.
    pub history_window: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Directory scanned for PDF documents on first build.
    pub corpus_dir: String,
    /// SQLite database holding the chunk + vector tables.
    pub index_path: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

impl Default for SkycastConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            weather: WeatherConfig::default(),
            speech: SpeechConfig::default(),
            agent: AgentConfig::default(),
            knowledge: KnowledgeConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8501,
            log_level: "info".into(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openweathermap.org/data/2.5".into(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.sws.speechify.com".into(),
            default_voice: "scott".into(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".into(),
            model: "mistral".into(),
            temperature: 0.5,
            max_iterations: 5,
            history_window: 4,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        let index_path = default_skycast_dir()
            .join("knowledge.db")
            .to_string_lossy()
            .into_owned();
        Self {
            corpus_dir: "data/climate_data".into(),
            index_path,
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_skycast_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

/// Returns `~/.skycast/`
pub fn default_skycast_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".skycast")
}

/// Returns the default config file path: `~/.skycast/config.toml`
pub fn default_config_path() -> PathBuf {
    default_skycast_dir().join("config.toml")
}

impl SkycastConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            SkycastConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides. API keys come from each provider's
    /// conventional variable name; a missing key degrades the feature rather
    /// than failing startup.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OPENWEATHER_API_KEY") {
            self.weather.api_key = val;
        }
        if let Ok(val) = std::env::var("SPEECHIFY_API_KEY") {
            self.speech.api_key = val;
        }
        if let Ok(val) = std::env::var("SKYCAST_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("SKYCAST_OLLAMA_URL") {
            self.agent.ollama_url = val;
        }
    }

    /// Resolve the knowledge index path, expanding `~` if needed.
    pub fn resolved_index_path(&self) -> PathBuf {
        expand_tilde(&self.knowledge.index_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SkycastConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.agent.max_iterations, 5);
        assert_eq!(config.agent.history_window, 4);
        assert_eq!(config.knowledge.chunk_size, 1000);
        assert_eq!(config.knowledge.chunk_overlap, 200);
        assert!(config.knowledge.index_path.ends_with("knowledge.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 9000
log_level = "debug"

[agent]
model = "llama3"
max_iterations = 3

[knowledge]
corpus_dir = "/tmp/pdfs"
"#;
        let config: SkycastConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.agent.model, "llama3");
        assert_eq!(config.agent.max_iterations, 3);
        assert_eq!(config.knowledge.corpus_dir, "/tmp/pdfs");
        // defaults still apply for unset fields
        assert_eq!(config.agent.history_window, 4);
        assert_eq!(config.knowledge.top_k, 3);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SkycastConfig::default();
        std::env::set_var("OPENWEATHER_API_KEY", "ow-test-key");
        std::env::set_var("SPEECHIFY_API_KEY", "sp-test-key");
        std::env::set_var("SKYCAST_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.weather.api_key, "ow-test-key");
        assert_eq!(config.speech.api_key, "sp-test-key");
        assert_eq!(config.server.log_level, "trace");

        // Clean up
        std::env::remove_var("OPENWEATHER_API_KEY");
        std::env::remove_var("SPEECHIFY_API_KEY");
        std::env::remove_var("SKYCAST_LOG_LEVEL");
    }

    #[test]
    fn missing_api_keys_do_not_fail_load() {
        let config = SkycastConfig::default();
        assert!(config.weather.api_key.is_empty());
        assert!(config.speech.api_key.is_empty());
    }
}
