use async_trait::async_trait;
use cidian_lookup::GeminiClient;
use cidian_types::WordDefinition;

use crate::SpeechError;

/// Single narration string: word, meaning, translation, grammar notes, each
/// behind a label so the narrator pauses between them.
pub fn compose(definition: &WordDefinition) -> String {
    let segments = [
        ("Word", definition.word.as_str()),
        ("Meaning", definition.definition.as_str()),
        ("Chinese translation", definition.chinese_translation.as_str()),
        ("Grammar notes", definition.grammar_notes.as_str()),
    ];

    segments
        .iter()
        .map(|(label, text)| {
            let text = text.trim();
            let end = if text.ends_with(['.', '!', '?', '。', '！', '？']) { "" } else { "." };
            format!("{label}: {text}{end}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text-to-audio service producing base64 16-bit PCM
#[async_trait]
pub trait SpeechGenerator: Send + Sync {
    /// `Ok(None)` when the service answered without audio
    async fn generate(&self, text: &str) -> Result<Option<String>, SpeechError>;
}

/// Narration through the Gemini TTS model with one prebuilt voice
pub struct GeminiNarrator {
    client: GeminiClient,
    voice: String,
}

impl GeminiNarrator {
    pub fn new(client: GeminiClient, voice: String) -> Self {
        Self { client, voice }
    }
}

#[async_trait]
impl SpeechGenerator for GeminiNarrator {
    async fn generate(&self, text: &str) -> Result<Option<String>, SpeechError> {
        tracing::info!("Requesting narration: voice={}, {} chars", self.voice, text.chars().count());
        Ok(self.client.generate_speech(text, &self.voice).await?)
    }
}
