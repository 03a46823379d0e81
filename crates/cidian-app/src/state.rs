use std::sync::Arc;

use cidian_config::Config;
use cidian_core::history::HistoryStore;
use cidian_core::state::SessionState;
use cidian_lookup::{GeminiClient, LookupClient};
use cidian_speech::pcm::NARRATION_SAMPLE_RATE;
use cidian_speech::{
    AudioOutput, CommandRecognizer, GeminiNarrator, NarrationBridge, Pronouncer, SpeechRecognizer,
    UnsupportedRecognizer, VoiceInputBridge,
};
use cidian_types::LookupMode;
use tokio::sync::RwLock;

use crate::profile;

/// Services shared by every task. Per-session data lives in [`SessionState`],
/// which only the event loop touches.
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub lookup: Arc<dyn LookupClient>,
    pub narration: NarrationBridge,
    pub pronouncer: Pronouncer,
    pub voice: VoiceInputBridge,
}

impl AppState {
    pub fn new(
        config: Config,
        lookup: Arc<dyn LookupClient>,
        narration: NarrationBridge,
        pronouncer: Pronouncer,
        voice: VoiceInputBridge,
    ) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            lookup,
            narration,
            pronouncer,
            voice,
        }
    }

    /// Wire the production services described by `config`
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let client = GeminiClient::from_config(&config.lookup)?;
        let metadata = client.metadata();
        if metadata.requires_api_key && config.lookup.api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set, lookups will fail");
        }
        tracing::info!(
            "Lookup provider ready: {} ({}), narration={}",
            metadata.name,
            metadata.model,
            config.lookup.tts_model
        );

        let sample_rate = match config.speech.sample_rate {
            0 => NARRATION_SAMPLE_RATE,
            rate => rate,
        };
        let narration = NarrationBridge::new(
            Arc::new(GeminiNarrator::new(client.clone(), config.lookup.voice.clone())),
            audio_output(config.speech.volume),
            sample_rate,
        );

        let recognizer: Arc<dyn SpeechRecognizer> = match &config.speech.recognizer_command {
            Some(command) if !command.trim().is_empty() => {
                tracing::info!("Voice input via '{}'", command);
                Arc::new(CommandRecognizer::new(command.clone()))
            }
            _ => Arc::new(UnsupportedRecognizer),
        };

        let pronouncer = Pronouncer::from_config(&config.speech);

        Ok(Self::new(
            config,
            Arc::new(client),
            narration,
            pronouncer,
            VoiceInputBridge::new(recognizer),
        ))
    }

    /// Fresh session with history loaded from disk
    pub async fn open_session(&self, mode: LookupMode) -> SessionState {
        let path = {
            let config = self.config.read().await;
            profile::history_path(&config.history)
        };

        let history = match path {
            Some(path) => HistoryStore::load(path),
            None => {
                tracing::warn!("No data directory, history will not be saved");
                HistoryStore::in_memory()
            }
        };

        SessionState::new(history, mode)
    }
}

#[cfg(feature = "rodio-output")]
fn audio_output(volume: f32) -> Arc<dyn AudioOutput> {
    Arc::new(cidian_speech::RodioOutput::new(volume))
}

#[cfg(not(feature = "rodio-output"))]
fn audio_output(_volume: f32) -> Arc<dyn AudioOutput> {
    Arc::new(cidian_speech::NullOutput)
}
