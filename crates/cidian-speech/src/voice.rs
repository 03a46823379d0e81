use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use cidian_types::{LookupMode, VoiceState};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Error code reported when a session ends without any transcript
pub const NO_SPEECH: &str = "no-speech";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Partial(String),
    Final(String),
    /// Platform error code
    Error(String),
}

/// One running recognizer. Cancelling `stop` ends it.
pub struct RecognitionSession {
    pub events: kanal::AsyncReceiver<RecognitionEvent>,
    pub stop: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerOptions {
    pub locale: String,
    pub interim_results: bool,
    pub max_alternatives: u8,
}

impl RecognizerOptions {
    pub fn for_mode(mode: LookupMode) -> Self {
        Self {
            locale: mode.recognizer_locale().to_string(),
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn is_supported(&self) -> bool;

    async fn start(&self, options: RecognizerOptions) -> Result<RecognitionSession, VoiceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("Speech recognition is not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("Recognizer error: {0}")]
    Recognizer(String),
}

/// What the bridge reports back to the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceUpdate {
    Partial(String),
    Final { transcript: String, mode: LookupMode },
    Failed(String),
}

struct ActiveSession {
    id: u64,
    stop: CancellationToken,
}

/// Voice input: `Idle -> Listening -> Finalizing -> Idle`, with
/// `Error(code) -> Idle` when the recognizer fails.
#[derive(Clone)]
pub struct VoiceInputBridge {
    recognizer: Arc<dyn SpeechRecognizer>,
    state_tx: Arc<watch::Sender<VoiceState>>,
    active: Arc<Mutex<Option<ActiveSession>>>,
    next_id: Arc<AtomicU64>,
}

impl VoiceInputBridge {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        let (state_tx, _) = watch::channel(VoiceState::Idle);
        Self {
            recognizer,
            state_tx: Arc::new(state_tx),
            active: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    pub fn state(&self) -> VoiceState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<VoiceState> {
        self.state_tx.subscribe()
    }

    /// Start listening in the language of `mode`. Any previous session is
    /// stopped first. Updates are sent on `updates` until the session ends.
    pub async fn start(
        &self,
        mode: LookupMode,
        updates: kanal::AsyncSender<VoiceUpdate>,
    ) -> Result<(), VoiceError> {
        if !self.recognizer.is_supported() {
            return Err(VoiceError::UnsupportedPlatform(
                "no speech recognizer available".to_string(),
            ));
        }

        if self.stop() {
            tracing::debug!("Stopped previous voice session");
        }

        let options = RecognizerOptions::for_mode(mode);
        tracing::info!("Listening ({})", options.locale);
        let session = self.recognizer.start(options).await?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut active = self.lock();
            if let Some(previous) = active.take() {
                previous.stop.cancel();
            }
            *active = Some(ActiveSession {
                id,
                stop: session.stop.clone(),
            });
            self.state_tx.send_replace(VoiceState::Listening);
        }

        let bridge = self.clone();
        tokio::spawn(async move { bridge.pump(id, session, mode, updates).await });

        Ok(())
    }

    /// Stop the active session, if any. Returns whether one was running.
    pub fn stop(&self) -> bool {
        let mut active = self.lock();
        match active.take() {
            Some(current) => {
                current.stop.cancel();
                self.state_tx.send_replace(VoiceState::Idle);
                true
            }
            None => false,
        }
    }

    async fn pump(
        &self,
        id: u64,
        session: RecognitionSession,
        mode: LookupMode,
        updates: kanal::AsyncSender<VoiceUpdate>,
    ) {
        loop {
            let event = tokio::select! {
                biased;
                _ = session.stop.cancelled() => return,
                event = session.events.recv() => event,
            };

            let update = match event {
                Ok(RecognitionEvent::Partial(text)) => {
                    if updates.send(VoiceUpdate::Partial(text)).await.is_err() {
                        break;
                    }
                    continue;
                }
                Ok(RecognitionEvent::Final(transcript)) => {
                    self.set_if_active(id, VoiceState::Finalizing);
                    let transcript = transcript.trim().to_string();
                    if transcript.is_empty() {
                        self.set_if_active(id, VoiceState::Error(NO_SPEECH.to_string()));
                        VoiceUpdate::Failed(NO_SPEECH.to_string())
                    } else {
                        tracing::info!("Voice input finalized: '{}'", transcript);
                        VoiceUpdate::Final { transcript, mode }
                    }
                }
                Ok(RecognitionEvent::Error(code)) => {
                    tracing::warn!("Recognizer reported '{}'", code);
                    self.set_if_active(id, VoiceState::Error(code.clone()));
                    VoiceUpdate::Failed(code)
                }
                Err(_) => {
                    tracing::debug!("Recognizer session {} closed", id);
                    break;
                }
            };

            let _ = updates.send(update).await;
            break;
        }

        self.finish(id);
    }

    fn set_if_active(&self, id: u64, state: VoiceState) {
        let active = self.lock();
        if active.as_ref().is_some_and(|current| current.id == id) {
            self.state_tx.send_replace(state);
        }
    }

    fn finish(&self, id: u64) {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|current| current.id == id) {
            if let Some(current) = active.take() {
                current.stop.cancel();
            }
            self.state_tx.send_replace(VoiceState::Idle);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    /// Replays a fixed script of events, optionally holding the session open
    struct ScriptedRecognizer {
        script: Vec<RecognitionEvent>,
        hold_open: bool,
        started: Mutex<Vec<RecognizerOptions>>,
        sessions: Mutex<Vec<CancellationToken>>,
    }

    impl ScriptedRecognizer {
        fn new(script: Vec<RecognitionEvent>) -> Arc<Self> {
            Arc::new(Self {
                script,
                hold_open: false,
                started: Mutex::new(Vec::new()),
                sessions: Mutex::new(Vec::new()),
            })
        }

        fn held() -> Arc<Self> {
            Arc::new(Self {
                script: Vec::new(),
                hold_open: true,
                started: Mutex::new(Vec::new()),
                sessions: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SpeechRecognizer for ScriptedRecognizer {
        fn is_supported(&self) -> bool {
            true
        }

        async fn start(&self, options: RecognizerOptions) -> Result<RecognitionSession, VoiceError> {
            self.started.lock().unwrap().push(options);

            let (tx, rx) = kanal::bounded_async(16);
            let stop = CancellationToken::new();
            self.sessions.lock().unwrap().push(stop.clone());

            let script = self.script.clone();
            let hold_open = self.hold_open;
            let session_stop = stop.clone();
            tokio::spawn(async move {
                for event in script {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
                if hold_open {
                    session_stop.cancelled().await;
                }
            });

            Ok(RecognitionSession { events: rx, stop })
        }
    }

    struct NoRecognizer;

    #[async_trait]
    impl SpeechRecognizer for NoRecognizer {
        fn is_supported(&self) -> bool {
            false
        }

        async fn start(&self, _options: RecognizerOptions) -> Result<RecognitionSession, VoiceError> {
            panic!("start must not be called on an unsupported recognizer");
        }
    }

    async fn collect(rx: &kanal::AsyncReceiver<VoiceUpdate>, count: usize) -> Vec<VoiceUpdate> {
        let mut updates = Vec::new();
        for _ in 0..count {
            let update = timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("voice update timed out")
                .unwrap();
            updates.push(update);
        }
        updates
    }

    async fn wait_idle(bridge: &VoiceInputBridge) {
        let mut rx = bridge.subscribe();
        timeout(Duration::from_secs(2), rx.wait_for(|s| *s == VoiceState::Idle))
            .await
            .expect("voice bridge never returned to idle")
            .unwrap();
    }

    #[tokio::test]
    async fn partials_then_final_with_mode() {
        let recognizer = ScriptedRecognizer::new(vec![
            RecognitionEvent::Partial("跑".to_string()),
            RecognitionEvent::Partial("跑步".to_string()),
            RecognitionEvent::Final("跑步".to_string()),
        ]);
        let bridge = VoiceInputBridge::new(recognizer.clone());
        let (tx, rx) = kanal::bounded_async(16);

        bridge.start(LookupMode::Cn, tx).await.unwrap();
        let updates = collect(&rx, 3).await;

        assert_eq!(
            updates,
            vec![
                VoiceUpdate::Partial("跑".to_string()),
                VoiceUpdate::Partial("跑步".to_string()),
                VoiceUpdate::Final {
                    transcript: "跑步".to_string(),
                    mode: LookupMode::Cn,
                },
            ]
        );
        wait_idle(&bridge).await;

        let started = recognizer.started.lock().unwrap();
        assert_eq!(started[0].locale, "zh-CN");
        assert!(started[0].interim_results);
        assert_eq!(started[0].max_alternatives, 1);
    }

    #[tokio::test]
    async fn recognizer_error_reports_code_then_idles() {
        let recognizer = ScriptedRecognizer::new(vec![RecognitionEvent::Error("network".to_string())]);
        let bridge = VoiceInputBridge::new(recognizer);
        let (tx, rx) = kanal::bounded_async(16);

        bridge.start(LookupMode::En, tx).await.unwrap();

        assert_eq!(collect(&rx, 1).await, vec![VoiceUpdate::Failed("network".to_string())]);
        wait_idle(&bridge).await;
    }

    #[tokio::test]
    async fn blank_final_is_no_speech() {
        let recognizer = ScriptedRecognizer::new(vec![RecognitionEvent::Final("  ".to_string())]);
        let bridge = VoiceInputBridge::new(recognizer);
        let (tx, rx) = kanal::bounded_async(16);

        bridge.start(LookupMode::En, tx).await.unwrap();

        assert_eq!(collect(&rx, 1).await, vec![VoiceUpdate::Failed(NO_SPEECH.to_string())]);
        wait_idle(&bridge).await;
    }

    #[tokio::test]
    async fn unsupported_platform_leaves_state_alone() {
        let bridge = VoiceInputBridge::new(Arc::new(NoRecognizer));
        let (tx, _rx) = kanal::bounded_async(16);

        let err = bridge.start(LookupMode::En, tx).await.unwrap_err();

        assert!(matches!(err, VoiceError::UnsupportedPlatform(_)));
        assert_eq!(bridge.state(), VoiceState::Idle);
    }

    #[tokio::test]
    async fn restarting_stops_previous_session() {
        let recognizer = ScriptedRecognizer::held();
        let bridge = VoiceInputBridge::new(recognizer.clone());
        let (tx, _rx) = kanal::bounded_async(16);

        bridge.start(LookupMode::En, tx.clone()).await.unwrap();
        assert_eq!(bridge.state(), VoiceState::Listening);
        bridge.start(LookupMode::Cn, tx).await.unwrap();

        let sessions = recognizer.sessions.lock().unwrap().clone();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].is_cancelled());
        assert!(!sessions[1].is_cancelled());
        assert_eq!(bridge.state(), VoiceState::Listening);

        assert!(bridge.stop());
        assert!(sessions[1].is_cancelled());
        assert_eq!(bridge.state(), VoiceState::Idle);
    }
}
