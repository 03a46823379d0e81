use std::env;

use serde::{Deserialize, Serialize};

fn default_espeak_binary() -> String {
    "espeak-ng".to_string()
}

fn default_sample_rate() -> u32 {
    24_000
}

fn default_volume() -> f32 {
    1.0
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SpeechConfig {
    #[serde(default = "default_espeak_binary")]
    pub espeak_binary: String,
    /// Sample rate of narration payloads
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Streaming recognizer command, `{locale}` is substituted; voice input is
    /// unavailable when empty
    #[serde(default)]
    pub recognizer_command: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            espeak_binary: default_espeak_binary(),
            sample_rate: default_sample_rate(),
            volume: default_volume(),
            recognizer_command: None,
        }
    }
}

impl SpeechConfig {
    pub fn new() -> Self {
        let espeak_binary = env::var("ESPEAK_BINARY").unwrap_or_else(|_| default_espeak_binary());
        let recognizer_command = env::var("CIDIAN_RECOGNIZER_CMD")
            .ok()
            .filter(|c| !c.trim().is_empty());

        Self {
            espeak_binary,
            recognizer_command,
            ..Self::default()
        }
    }
}
