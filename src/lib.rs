//! Conversational weather assistant.
//!
//! Skycast serves a browser UI and JSON API for current weather, multi-interval
//! forecasts with chart series, and a chat assistant driven by a ReAct-style
//! reasoning loop over four tools:
//!
//! | Tool | Backed by |
//! |------|-----------|
//! | `get_current_weather` | OpenWeatherMap current conditions |
//! | `get_forecast_weather` | OpenWeatherMap 5-day/3-hour forecast |
//! | `get_current_date_time` | Provider UTC timestamp + city offset |
//! | `search_weather_knowledge` | Vector index over a local PDF corpus |
//!
//! Answers can be narrated via the Speechify text-to-speech API.
//!
//! # Architecture
//!
//! - **Agent**: textual thought/action/observation loop with a sliding
//!   conversation window and a five-iteration budget; the planner is an
//!   Ollama-served LLM
//! - **Knowledge**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   for vector search; embeddings from local ONNX Runtime with
//!   all-MiniLM-L6-v2 (384 dimensions)
//! - **Transport**: axum HTTP server; all remote failures degrade to soft,
//!   user-visible messages
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`agent`] — The reasoning loop: planner, protocol parser, history window
//! - [`tools`] — The four string-in/string-out tools the agent can invoke
//! - [`weather`] — Weather provider client and report formatting
//! - [`localtime`] — City-local time from provider UTC fields
//! - [`knowledge`] — PDF ingestion, chunking, and the persisted vector index
//! - [`embedding`] — Text-to-vector embedding pipeline via ONNX Runtime
//! - [`speech`] — Text-to-speech client with legacy voice-id compatibility

pub mod agent;
pub mod config;
pub mod embedding;
pub mod knowledge;
pub mod localtime;
pub mod speech;
pub mod tools;
pub mod weather;
