use std::time::Duration;

use async_trait::async_trait;
use cidian_config::lookup::LookupConfig;
use cidian_types::{LookupMode, WordDefinition};
use serde::{Deserialize, Serialize};

use crate::parse::parse_word_definition;
use crate::prompt::build_prompt;
use crate::schema::word_definition_schema;
use crate::{LookupClient, LookupError, ProviderMetadata, require_query};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    #[serde(alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
    #[allow(dead_code)]
    code: Option<i32>,
}

impl GenerateRequest {
    pub(crate) fn lookup(query: &str, mode: LookupMode) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(query, mode),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(word_definition_schema()),
                ..Default::default()
            },
        }
    }

    pub(crate) fn speech(text: &str, voice: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                }),
                ..Default::default()
            },
        }
    }
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    pub(crate) fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()?
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// Base64 audio payload of the first candidate
    pub(crate) fn audio_data(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.inline_data)
            .map(|d| d.data)
            .find(|d| !d.is_empty())
    }

    fn first_parts(&self) -> Option<&[ResponsePart]> {
        let candidate = self.candidates.as_ref()?.first()?;
        Some(candidate.content.as_ref()?.parts.as_slice())
    }
}

/// Map a non-success HTTP status (and body) to a lookup error
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> LookupError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return LookupError::RateLimitExceeded;
    }

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return LookupError::AuthenticationError;
    }

    let api_error = serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|r| r.error);

    match api_error {
        Some(error) if error.status.as_deref() == Some("RESOURCE_EXHAUSTED") => {
            LookupError::RateLimitExceeded
        }
        Some(error)
            if error.status.as_deref() == Some("PERMISSION_DENIED")
                || error.message.contains("API key") =>
        {
            LookupError::AuthenticationError
        }
        Some(error) => LookupError::RequestFailed(format!("HTTP {}: {}", status, error.message)),
        None => LookupError::RequestFailed(format!("HTTP {}", status)),
    }
}

/// Gemini `generateContent` client for lookups and narration audio
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
    tts_model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, api_url: String, model: String, tts_model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
            model,
            tts_model,
        }
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            tts_model: config.tts_model.clone(),
        })
    }

    /// Generate narration audio for `text`. `Ok(None)` means the service
    /// answered without an audio payload.
    pub async fn generate_speech(
        &self,
        text: &str,
        voice: &str,
    ) -> Result<Option<String>, LookupError> {
        let response = self
            .generate(&self.tts_model, &GenerateRequest::speech(text, voice))
            .await?;

        let data = response.audio_data();
        tracing::debug!(
            "Narration payload: {} base64 chars",
            data.as_ref().map_or(0, String::len)
        );
        Ok(data)
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, LookupError> {
        if self.api_key.is_empty() {
            return Err(LookupError::AuthenticationError);
        }

        let url = format!("{}/{}:generateContent", self.api_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Gemini API error: status={}, body={}", status, body);
            return Err(status_error(status, &body));
        }

        let mut parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            LookupError::InvalidResponse(format!("Failed to parse response envelope: {e}"))
        })?;

        if let Some(error) = parsed.error.take() {
            return Err(LookupError::RequestFailed(error.message));
        }

        Ok(parsed)
    }
}

#[async_trait]
impl LookupClient for GeminiClient {
    async fn lookup(&self, query: &str, mode: LookupMode) -> Result<WordDefinition, LookupError> {
        let query = require_query(query)?;
        tracing::info!("Gemini lookup: model={}, mode={}, query={}", self.model, mode, query);

        let response = self
            .generate(&self.model, &GenerateRequest::lookup(query, mode))
            .await?;

        let text = response
            .text()
            .ok_or_else(|| LookupError::InvalidResponse("No text in response".to_string()))?;

        parse_word_definition(&text)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Gemini".to_string(),
            model: self.model.clone(),
            requires_api_key: true,
        }
    }
}
