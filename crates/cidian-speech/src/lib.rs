use cidian_lookup::LookupError;

pub mod bridge;
pub mod narration;
pub mod output;
pub mod pcm;
pub mod pronounce;
pub mod recognizer;
pub mod voice;

pub use bridge::{NarrationBridge, NarrationOutcome};
pub use narration::{GeminiNarrator, SpeechGenerator};
pub use output::{AudioOutput, NullOutput, Playback, PlaybackEnd};
#[cfg(feature = "rodio-output")]
pub use output::RodioOutput;
pub use pcm::PcmBuffer;
pub use pronounce::{EspeakBackend, Pronouncer, SpeechBackend, Utterance};
pub use recognizer::{CommandRecognizer, UnsupportedRecognizer};
pub use voice::{
    RecognitionEvent, RecognitionSession, RecognizerOptions, SpeechRecognizer, VoiceError,
    VoiceInputBridge, VoiceUpdate,
};

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("No audio payload returned")]
    NoAudioPayload,

    #[error("Audio generation failed: {0}")]
    Generation(#[from] LookupError),

    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("Playback error: {0}")]
    Playback(String),
}

impl SpeechError {
    /// Text shown to the user; details stay in the logs
    pub fn user_message(&self) -> String {
        match self {
            SpeechError::UnsupportedPlatform(what) => format!("Speech is not available here ({what})."),
            SpeechError::NoAudioPayload => "The narration service returned no audio, try again.".to_string(),
            SpeechError::Generation(e) => e.user_message(),
            SpeechError::Decode(_) | SpeechError::Playback(_) => {
                "Narration could not be played.".to_string()
            }
        }
    }
}
