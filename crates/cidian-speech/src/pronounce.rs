use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::Arc;

use cidian_config::speech::SpeechConfig;

use crate::SpeechError;

/// espeak-ng's default speaking rate in words per minute
const ESPEAK_DEFAULT_WPM: f32 = 175.0;

pub const PRONUNCIATION_LOCALE: &str = "en-US";
/// Multiplier over the voice's default rate
pub const PRONUNCIATION_RATE: f32 = 0.85;

/// One request to a local voice
#[derive(Debug, Clone, Copy)]
pub struct Utterance<'a> {
    pub text: &'a str,
    pub locale: &'a str,
    /// Multiplier over the voice's default rate
    pub rate: f32,
}

/// Local text-to-speech voice
pub trait SpeechBackend: Send + Sync {
    /// Hand the utterance to the platform and return without waiting for it
    fn speak(&self, utterance: &Utterance<'_>) -> Result<(), SpeechError>;

    fn name(&self) -> &str;
}

/// `espeak-ng` subprocess voice
pub struct EspeakBackend {
    binary: String,
}

impl EspeakBackend {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn args(utterance: &Utterance<'_>) -> Vec<String> {
        let wpm = (ESPEAK_DEFAULT_WPM * utterance.rate).round().max(80.0) as u32;
        vec![
            "-v".to_string(),
            utterance.locale.to_ascii_lowercase(),
            "-s".to_string(),
            wpm.to_string(),
            "--".to_string(),
            utterance.text.to_string(),
        ]
    }
}

impl SpeechBackend for EspeakBackend {
    fn speak(&self, utterance: &Utterance<'_>) -> Result<(), SpeechError> {
        let mut child = tokio::process::Command::new(&self.binary)
            .args(Self::args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    SpeechError::UnsupportedPlatform(format!("{} is not installed", self.binary))
                }
                _ => SpeechError::Playback(format!("failed to start {}: {e}", self.binary)),
            })?;

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!("Pronunciation voice exited with {}", status)
                }
                Err(e) => tracing::warn!("Pronunciation voice failed: {}", e),
                _ => {}
            }
        });

        Ok(())
    }

    fn name(&self) -> &str {
        "espeak-ng"
    }
}

/// Word pronunciation at a fixed locale and a slowed-down rate
#[derive(Clone)]
pub struct Pronouncer {
    backend: Arc<dyn SpeechBackend>,
}

impl Pronouncer {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(Arc::new(EspeakBackend::new(config.espeak_binary.clone())))
    }

    /// Speak `word`. Fire-and-forget; empty input is a no-op.
    pub fn pronounce(&self, word: &str) -> Result<(), SpeechError> {
        let word = word.trim();
        if word.is_empty() {
            return Ok(());
        }

        tracing::debug!("Pronouncing '{}' via {}", word, self.backend.name());
        self.backend.speak(&Utterance {
            text: word,
            locale: PRONUNCIATION_LOCALE,
            rate: PRONUNCIATION_RATE,
        })
    }
}
