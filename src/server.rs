//! HTTP server: the browser UI and the JSON API behind it.
//!
//! Every handler is a single blocking round-trip from the browser's point of
//! view: no background work, no cancellation. Failures never surface as 500s
//! with stack traces; they come back as soft, user-visible messages so the
//! page keeps working.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::agent::planner::OllamaPlanner;
use crate::agent::{AgentExecutor, ChatSession};
use crate::config::SkycastConfig;
use crate::embedding;
use crate::knowledge::KnowledgeIndex;
use crate::speech::{SpeechClient, VOICE_CHOICES};
use crate::tools::{
    CurrentWeatherTool, DateTimeTool, ForecastWeatherTool, KnowledgeSearchTool, Tool, ToolRegistry,
};
use crate::weather::{ForecastInterval, WeatherClient};

const APP_HTML: &str = include_str!("../assets/app.html");

/// State persisted across view refreshes within one session. One session per
/// process; turns run sequentially under the mutex.
#[derive(Default)]
pub struct SessionState {
    pub chat: Option<ChatSession>,
    pub last_answer: Option<String>,
    pub last_voice_id: Option<String>,
    pub last_forecast: Option<ForecastView>,
}

pub struct AppState {
    weather: WeatherClient,
    speech: SpeechClient,
    agent: AgentExecutor,
    default_voice: String,
    history_window: usize,
    session: Mutex<SessionState>,
}

/// Forecast data shaped for the page: the interval list plus the three chart
/// series, both trimmed to the requested interval count.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastView {
    pub city: String,
    pub intervals: Vec<ForecastInterval>,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub wind: Vec<f64>,
}

impl ForecastView {
    /// Trim intervals to `count` and derive the chart series from them, so the
    /// list and the chart always show the same points.
    pub fn build(city: &str, intervals: &[ForecastInterval], count: usize) -> Self {
        let shown = &intervals[..count.min(intervals.len())];
        Self {
            city: city.to_string(),
            intervals: shown.to_vec(),
            chart: ChartSeries {
                labels: shown.iter().map(|i| i.datetime.clone()).collect(),
                temperature: shown.iter().map(|i| i.temp).collect(),
                humidity: shown.iter().map(|i| i.humidity).collect(),
                wind: shown.iter().map(|i| i.wind).collect(),
            },
        }
    }
}

/// Build all collaborators and start the server. Missing credentials degrade
/// individual features; only a failed socket bind is fatal.
pub async fn serve(config: SkycastConfig) -> Result<()> {
    let weather = WeatherClient::new(&config.weather);
    let speech = SpeechClient::new(&config.speech);

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
        Arc::new(DateTimeTool::new(weather.clone())),
        Arc::new(KnowledgeSearchTool::new(knowledge, config.knowledge.top_k)),
    ])?;

    let planner = Arc::new(OllamaPlanner::new(&config.agent));
    let agent = AgentExecutor::new(planner, tools, &config.agent);

    let state = Arc::new(AppState {
        weather,
        speech,
        agent,
        default_voice: config.speech.default_voice.clone(),
        history_window: config.agent.history_window,
        session: Mutex::new(SessionState::default()),
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let router = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "weather assistant listening at http://{bind_addr}/");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/weather/current", get(current_weather))
        .route("/api/weather/forecast", get(forecast))
        .route("/api/chat", post(chat))
        .route("/api/speak", post(speak))
        .route("/api/voices", get(voices))
        .route("/api/session", get(session))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(APP_HTML)
}

#[derive(Deserialize)]
struct CityQuery {
    #[serde(default)]
    city: String,
}

#[derive(Serialize)]
struct CurrentResponse {
    city: String,
    report_lines: Vec<String>,
    readable: String,
    error: bool,
}

async fn current_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Json<CurrentResponse> {
    let city = query.city.trim().to_string();
    let weather = state.weather.fetch_current(&city).await;
    let error = weather.is_error();
    Json(CurrentResponse {
        city,
        report_lines: weather.report.lines().map(str::to_string).collect(),
        readable: weather.readable,
        error,
    })
}

#[derive(Deserialize)]
struct ForecastQuery {
    #[serde(default)]
    city: String,
    intervals: Option<usize>,
}

#[derive(Serialize)]
struct ForecastResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    forecast: Option<ForecastView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Json<ForecastResponse> {
    let city = query.city.trim().to_string();
    if city.is_empty() {
        return Json(ForecastResponse {
            forecast: None,
            error: Some("Please enter a city name.".into()),
        });
    }
    let count = requested_intervals(query.intervals);

    let data = state.weather.fetch_forecast(&city).await;
    if data.is_empty() {
        return Json(ForecastResponse {
            forecast: None,
            error: Some("Could not retrieve forecast data.".into()),
        });
    }

    let view = ForecastView::build(&city, &data.intervals, count);
    state.session.lock().await.last_forecast = Some(view.clone());
    Json(ForecastResponse {
        forecast: Some(view),
        error: None,
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let message = request.message.trim().to_string();
    if message.is_empty() {
        return Json(ChatResponse {
            answer: "Please ask about the weather, forecast, or time.".into(),
        });
    }

    let mut session = state.session.lock().await;
    let mut chat = session
        .chat
        .take()
        .unwrap_or_else(|| ChatSession::new(state.history_window));

    let answer = state.agent.run_turn(&mut chat, &message).await;

    session.chat = Some(chat);
    session.last_answer = Some(answer.clone());
    Json(ChatResponse { answer })
}

#[derive(Deserialize)]
struct SpeakRequest {
    voice_id: Option<String>,
}

async fn speak(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeakRequest>,
) -> Response {
    let (text, voice_id) = {
        let mut session = state.session.lock().await;
        if let Some(voice) = request.voice_id {
            session.last_voice_id = Some(voice);
        }
        let voice_id = session
            .last_voice_id
            .clone()
            .unwrap_or_else(|| state.default_voice.clone());
        (session.last_answer.clone(), voice_id)
    };

    let Some(text) = text else {
        return soft_error(StatusCode::NOT_FOUND, "Nothing to speak yet. Ask the assistant first.");
    };

    match state.speech.synthesize(&text, &voice_id).await {
        Some(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/mpeg")],
            bytes,
        )
            .into_response(),
        None => soft_error(StatusCode::SERVICE_UNAVAILABLE, "couldn't generate audio"),
    }
}

/// Interval count for the forecast view: defaults to 10, bounded by the
/// provider's 40-entry window.
fn requested_intervals(raw: Option<usize>) -> usize {
    raw.unwrap_or(10).clamp(1, 40)
}

fn soft_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[derive(Serialize)]
struct VoiceChoice {
    name: &'static str,
    voice_id: &'static str,
}

async fn voices() -> Json<Vec<VoiceChoice>> {
    Json(
        VOICE_CHOICES
            .iter()
            .map(|(name, voice_id)| VoiceChoice { name, voice_id })
            .collect(),
    )
}

#[derive(Serialize)]
struct SessionResponse {
    last_answer: Option<String>,
    last_voice_id: Option<String>,
    last_forecast: Option<ForecastView>,
}

async fn session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let session = state.session.lock().await;
    Json(SessionResponse {
        last_answer: session.last_answer.clone(),
        last_voice_id: session.last_voice_id.clone(),
        last_forecast: session.last_forecast.clone(),
    })
}
