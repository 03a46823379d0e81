use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use cidian_types::{NarrationState, WordDefinition};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::SpeechError;
use crate::narration::{SpeechGenerator, compose};
use crate::output::{AudioOutput, PlaybackEnd};
use crate::pcm::decode_base64_pcm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationOutcome {
    /// Audio is now playing
    Started,
    /// A narration was stopped (by this call or while it was loading)
    Stopped,
    /// A narration is still loading; nothing changed
    Busy,
}

struct ActiveNarration {
    id: u64,
    stop: CancellationToken,
}

/// Full-explanation narration: `Idle -> Loading -> Playing -> Idle`.
///
/// At most one narration exists at a time. Triggering while playing stops it.
#[derive(Clone)]
pub struct NarrationBridge {
    generator: Arc<dyn SpeechGenerator>,
    output: Arc<dyn AudioOutput>,
    sample_rate: u32,
    state_tx: Arc<watch::Sender<NarrationState>>,
    active: Arc<Mutex<Option<ActiveNarration>>>,
    next_id: Arc<AtomicU64>,
}

impl NarrationBridge {
    pub fn new(
        generator: Arc<dyn SpeechGenerator>,
        output: Arc<dyn AudioOutput>,
        sample_rate: u32,
    ) -> Self {
        let (state_tx, _) = watch::channel(NarrationState::Idle);
        Self {
            generator,
            output,
            sample_rate,
            state_tx: Arc::new(state_tx),
            active: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> NarrationState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NarrationState> {
        self.state_tx.subscribe()
    }

    /// Start narrating `definition`, or stop the narration that is playing.
    ///
    /// Returns once the output is connected and playing; playback continues
    /// in the background and returns the bridge to Idle when it ends. A
    /// connection failure is returned here and the bridge stays Idle.
    pub async fn toggle(&self, definition: &WordDefinition) -> Result<NarrationOutcome, SpeechError> {
        let (id, stop) = {
            let mut active = self.lock();
            match self.state() {
                NarrationState::Playing => {
                    if let Some(current) = active.take() {
                        current.stop.cancel();
                    }
                    self.state_tx.send_replace(NarrationState::Idle);
                    tracing::info!("Narration stopped");
                    return Ok(NarrationOutcome::Stopped);
                }
                NarrationState::Loading => return Ok(NarrationOutcome::Busy),
                NarrationState::Idle => {}
            }

            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let stop = CancellationToken::new();
            *active = Some(ActiveNarration {
                id,
                stop: stop.clone(),
            });
            self.state_tx.send_replace(NarrationState::Loading);
            (id, stop)
        };

        let text = compose(definition);
        tracing::debug!("Narration {} loading for '{}'", id, definition.word);

        let generated = tokio::select! {
            result = self.generator.generate(&text) => result,
            _ = stop.cancelled() => return Ok(NarrationOutcome::Stopped),
        };

        let payload = match generated {
            Ok(Some(payload)) if !payload.trim().is_empty() => payload,
            Ok(_) => {
                self.finish(id);
                tracing::warn!("Narration {} returned no audio", id);
                return Err(SpeechError::NoAudioPayload);
            }
            Err(e) => {
                self.finish(id);
                tracing::error!("Narration {} generation failed: {}", id, e);
                return Err(e);
            }
        };

        let buffer = match decode_base64_pcm(&payload, self.sample_rate, 1) {
            Ok(buffer) if !buffer.is_empty() => buffer,
            Ok(_) => {
                self.finish(id);
                return Err(SpeechError::NoAudioPayload);
            }
            Err(e) => {
                self.finish(id);
                tracing::error!("Narration {} decode failed: {}", id, e);
                return Err(e);
            }
        };

        let playback = match self.output.start(buffer, stop.clone()).await {
            Ok(playback) => playback,
            Err(e) => {
                self.finish(id);
                tracing::error!("Narration {} could not start playback: {}", id, e);
                return Err(e);
            }
        };

        if !self.mark_playing(id) {
            stop.cancel();
            return Ok(NarrationOutcome::Stopped);
        }

        let bridge = self.clone();
        tokio::spawn(async move {
            match playback.finished().await {
                Ok(PlaybackEnd::Finished) => tracing::debug!("Narration {} finished", id),
                Ok(PlaybackEnd::Stopped) => tracing::debug!("Narration {} stopped", id),
                Err(e) => tracing::error!("Narration {} playback failed: {}", id, e),
            }
            bridge.finish(id);
        });

        Ok(NarrationOutcome::Started)
    }

    /// Stop whatever narration is loading or playing. Returns whether one was.
    pub fn stop(&self) -> bool {
        let mut active = self.lock();
        let stopped = match active.take() {
            Some(current) => {
                current.stop.cancel();
                true
            }
            None => false,
        };
        self.state_tx.send_replace(NarrationState::Idle);
        stopped
    }

    fn mark_playing(&self, id: u64) -> bool {
        let active = self.lock();
        match active.as_ref() {
            Some(current) if current.id == id && !current.stop.is_cancelled() => {
                self.state_tx.send_replace(NarrationState::Playing);
                true
            }
            _ => false,
        }
    }

    /// Return to Idle if `id` is still the active narration
    fn finish(&self, id: u64) {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|current| current.id == id) {
            active.take();
            self.state_tx.send_replace(NarrationState::Idle);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveNarration>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
