//! Event-loop tests driven through the same channels the terminal uses


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cidian_config::Config;
use cidian_core::history::HistoryStore;
use cidian_core::state::SessionState;
use cidian_lookup::{FixtureLookupClient, LookupClient};
use cidian_speech::output::{Playback, PlaybackEnd};
use cidian_speech::pcm::{NARRATION_SAMPLE_RATE, PcmBuffer, encode_base64_pcm};
use cidian_speech::{
    AudioOutput, NarrationBridge, Pronouncer, RecognitionEvent, RecognitionSession,
    RecognizerOptions, SpeechBackend, SpeechError, SpeechGenerator, SpeechRecognizer,
    UnsupportedRecognizer, Utterance, VoiceError, VoiceInputBridge,
};
use cidian_types::{AppEvent, LookupMode, TextSource};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::state::AppState;

pub const WAIT: Duration = Duration::from_secs(2);

#[derive(Default)]
pub struct CountingGenerator {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechGenerator for CountingGenerator {
    async fn generate(&self, text: &str) -> Result<Option<String>, SpeechError> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(Some(encode_base64_pcm(&[0.0, 0.5, -0.5, 0.0])))
    }
}

/// Plays until told to stop, or refuses to connect once unplugged
#[derive(Default)]
pub struct HeldOutput {
    pub played: Mutex<Vec<PcmBuffer>>,
    pub unplugged: AtomicBool,
}

#[async_trait]
impl AudioOutput for HeldOutput {
    async fn start(&self, buffer: PcmBuffer, stop: CancellationToken) -> Result<Playback, SpeechError> {
        if self.unplugged.load(Ordering::SeqCst) {
            return Err(SpeechError::UnsupportedPlatform("no output device".to_string()));
        }

        self.played.lock().unwrap().push(buffer);
        Ok(Playback::spawn(async move {
            stop.cancelled().await;
            Ok(PlaybackEnd::Stopped)
        }))
    }
}

#[derive(Default)]
pub struct RecordingVoice {
    pub spoken: Mutex<Vec<String>>,
}

impl SpeechBackend for RecordingVoice {
    fn speak(&self, utterance: &Utterance<'_>) -> Result<(), SpeechError> {
        self.spoken.lock().unwrap().push(utterance.text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Emits a fixed script of recognition events per session
pub struct ScriptedRecognizer {
    pub script: Vec<RecognitionEvent>,
    pub locales: Mutex<Vec<String>>,
}

impl ScriptedRecognizer {
    pub fn new(script: Vec<RecognitionEvent>) -> Self {
        Self {
            script,
            locales: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    fn is_supported(&self) -> bool {
        true
    }

    async fn start(&self, options: RecognizerOptions) -> Result<RecognitionSession, VoiceError> {
        self.locales.lock().unwrap().push(options.locale);

        let (tx, rx) = kanal::bounded_async(16);
        let script = self.script.clone();
        tokio::spawn(async move {
            for event in script {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(RecognitionSession {
            events: rx,
            stop: CancellationToken::new(),
        })
    }
}

/// A running event loop with fake services
pub struct Harness {
    pub state: Arc<AppState>,
    pub generator: Arc<CountingGenerator>,
    pub output: Arc<HeldOutput>,
    pub voice: Arc<RecordingVoice>,
    pub input: AsyncSender<AppEvent>,
    pub ui: AsyncReceiver<AppEvent>,
    pub cancel: CancellationToken,
}

impl Harness {
    pub fn start(lookup: FixtureLookupClient) -> Self {
        Self::start_with(Arc::new(lookup), Arc::new(UnsupportedRecognizer))
    }

    pub fn start_with(lookup: Arc<dyn LookupClient>, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        let generator = Arc::new(CountingGenerator::default());
        let output = Arc::new(HeldOutput::default());
        let voice = Arc::new(RecordingVoice::default());

        let state = Arc::new(AppState::new(
            Config::default(),
            lookup,
            NarrationBridge::new(generator.clone(), output.clone(), NARRATION_SAMPLE_RATE),
            Pronouncer::new(voice.clone()),
            VoiceInputBridge::new(recognizer),
        ));

        let (input_tx, input_rx) = kanal::bounded_async(64);
        let (ui_tx, ui_rx) = kanal::bounded_async(256);
        let cancel = CancellationToken::new();

        tokio::spawn(event_loop(
            state.clone(),
            SessionState::new(HistoryStore::in_memory(), LookupMode::En),
            input_rx,
            input_tx.clone(),
            ui_tx,
            cancel.clone(),
        ));

        Self {
            state,
            generator,
            output,
            voice,
            input: input_tx,
            ui: ui_rx,
            cancel,
        }
    }

    pub async fn type_line(&self, line: &str) {
        self.input
            .send(AppEvent::RawTextInput {
                text: line.to_string(),
                source: TextSource::Keyboard,
            })
            .await
            .expect("event loop gone");
    }

    /// Next UI event matching `pred`, skipping others
    pub async fn expect<F>(&self, what: &str, pred: F) -> AppEvent
    where
        F: Fn(&AppEvent) -> bool,
    {
        let result = timeout(WAIT, async {
            loop {
                let event = self.ui.recv().await.expect("ui channel closed");
                if pred(&event) {
                    return event;
                }
            }
        })
        .await;

        match result {
            Ok(event) => event,
            Err(_) => panic!("Timeout waiting for {what}"),
        }
    }

    /// Drain UI events for `window`, returning everything seen
    pub async fn collect_for(&self, window: Duration) -> Vec<AppEvent> {
        let mut seen = Vec::new();
        let _ = timeout(window, async {
            while let Ok(event) = self.ui.recv().await {
                seen.push(event);
            }
        })
        .await;
        seen
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
