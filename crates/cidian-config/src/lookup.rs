use std::env;

use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Settings for the generative-language service
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct LookupConfig {
    /// Never written to profiles; read from the environment at startup
    #[serde(skip_serializing, default)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Model used for structured lookups
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used for narration audio
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// Prebuilt narration voice
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_api_url(),
            model: default_model(),
            tts_model: default_tts_model(),
            voice: default_voice(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl LookupConfig {
    pub fn new() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .unwrap_or_default();

        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| default_api_url());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| default_model());
        let tts_model = env::var("GEMINI_TTS_MODEL").unwrap_or_else(|_| default_tts_model());
        let voice = env::var("CIDIAN_VOICE").unwrap_or_else(|_| default_voice());

        let timeout_seconds = env::var("TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_timeout_seconds);

        Self {
            api_key,
            api_url,
            model,
            tts_model,
            voice,
            timeout_seconds,
        }
    }

    /// Pick up the credential from the environment without touching other fields
    pub fn apply_env_credentials(&mut self) {
        if let Ok(key) = env::var("GEMINI_API_KEY").or_else(|_| env::var("API_KEY")) {
            self.api_key = key;
        }
    }
}
