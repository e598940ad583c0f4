//! Text-to-speech via the Speechify API.
//!
//! Synthesis is best-effort: a missing API key, a transport failure, or an
//! undecodable payload all yield `None`, and the caller treats that as
//! "speech unavailable". Legacy ElevenLabs voice ids are mapped to their
//! Speechify replacement for backward compatibility.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::SpeechConfig;

/// Legacy ElevenLabs voice ids → the Speechify voice that replaced them.
/// Unmapped ids pass through unchanged.
static VOICE_COMPAT: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("21m00Tcm4TlvDq8ikWAM", "scott"), // Rachel
        ("EXAVITQu4vr4xnSDxMaL", "scott"), // Bella
        ("AZnzlk1XvdvUeBnXmlld", "scott"), // Antoni
        ("IKne3meq5aSn9XLyUdCD", "scott"), // Daniel
    ])
});

/// Voice options offered by the UI. The legacy ids are kept so stored
/// selections from before the provider migration keep working.
pub const VOICE_CHOICES: &[(&str, &str)] = &[
    ("Scott", "scott"),
    ("Rachel", "21m00Tcm4TlvDq8ikWAM"),
    ("Bella", "EXAVITQu4vr4xnSDxMaL"),
    ("Antoni", "AZnzlk1XvdvUeBnXmlld"),
    ("Daniel", "IKne3meq5aSn9XLyUdCD"),
];

/// Map a (possibly legacy) voice id to the current provider id.
pub fn resolve_voice_id(voice_id: &str) -> &str {
    VOICE_COMPAT.get(voice_id).copied().unwrap_or(voice_id)
}

/// Pick the synthesis profile. Any character outside the 7-bit range selects
/// the multilingual model. A heuristic, not language detection.
pub fn select_model(text: &str) -> &'static str {
    if text.chars().any(|c| c as u32 > 127) {
        "simba-multilingual"
    } else {
        "simba-english"
    }
}

/// A voice as listed by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Voice {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub models: Vec<VoiceModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceModel {
    pub name: String,
    #[serde(default)]
    pub languages: Vec<VoiceLanguage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceLanguage {
    pub locale: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    input: &'a str,
    voice_id: &'a str,
    model: &'a str,
    audio_format: &'a str,
    options: SpeechOptions,
}

#[derive(Serialize)]
struct SpeechOptions {
    loudness_normalization: bool,
    text_normalization: bool,
}

#[derive(Deserialize)]
struct SpeechResponse {
    audio_data: String,
}

pub struct SpeechClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl SpeechClient {
    pub fn new(config: &SpeechConfig) -> Self {
        let api_key = if config.api_key.is_empty() {
            tracing::warn!("no Speechify API key configured, speech synthesis disabled");
            None
        } else {
            Some(config.api_key.clone())
        };
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// True when a credential is configured.
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Synthesize `text` as mp3 bytes. `None` means speech is unavailable for
    /// any reason; the caller must not treat it as fatal.
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> Option<Vec<u8>> {
        let api_key = self.api_key.as_ref()?;
        let voice_id = resolve_voice_id(voice_id);
        let model = select_model(text);

        let request = SpeechRequest {
            input: text,
            voice_id,
            model,
            audio_format: "mp3",
            options: SpeechOptions {
                loudness_normalization: true,
                text_normalization: true,
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/audio/speech", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(status = %r.status(), voice_id, "speech request rejected");
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "speech request failed");
                return None;
            }
        };

        let body: SpeechResponse = match response.json().await {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(error = %err, "failed to decode speech response");
                return None;
            }
        };

        match base64::engine::general_purpose::STANDARD.decode(&body.audio_data) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(error = %err, "speech payload was not valid base64");
                None
            }
        }
    }

    /// List the provider's available voices; empty on any failure.
    pub async fn list_voices(&self) -> Vec<Voice> {
        let Some(api_key) = self.api_key.as_ref() else {
            return Vec::new();
        };

        let response = self
            .http
            .get(format!("{}/v1/voices", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => r.json().await.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "failed to decode voices response");
                Vec::new()
            }),
            Ok(r) => {
                tracing::warn!(status = %r.status(), "voices request rejected");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(error = %err, "voices request failed");
                Vec::new()
            }
        }
    }
}

/// Filter voices by gender, locale, and/or tags; returns the model names of
/// the matching voices.
pub fn filter_voice_models(
    voices: &[Voice],
    gender: Option<&str>,
    locale: Option<&str>,
    tags: Option<&[String]>,
) -> Vec<String> {
    let mut results = Vec::new();

    for voice in voices {
        if let Some(g) = gender {
            if !voice.gender.eq_ignore_ascii_case(g) {
                continue;
            }
        }
        if let Some(l) = locale {
            let has_locale = voice
                .models
                .iter()
                .any(|m| m.languages.iter().any(|lang| lang.locale == l));
            if !has_locale {
                continue;
            }
        }
        if let Some(required) = tags {
            if !required.iter().all(|t| voice.tags.contains(t)) {
                continue;
            }
        }
        results.extend(voice.models.iter().map(|m| m.name.clone()));
    }

    results
}
