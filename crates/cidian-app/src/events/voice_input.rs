use cidian_speech::{VoiceError, VoiceUpdate};
use cidian_types::{AppEvent, LookupMode};
use kanal::AsyncSender;

use crate::state::AppState;

/// Start listening in `mode`. Recognizer updates are fed back into the event
/// loop, where a final transcript becomes a lookup.
pub async fn handle_start_voice(
    state: &AppState,
    mode: LookupMode,
    feedback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (updates_tx, updates_rx) = kanal::bounded_async::<VoiceUpdate>(32);

    match state.voice.start(mode, updates_tx).await {
        Ok(()) => {
            app_to_ui_tx
                .send(AppEvent::StatusUpdate(format!(
                    "Listening ({})...",
                    mode.recognizer_locale()
                )))
                .await?;
        }
        Err(e) => {
            tracing::warn!("Voice input unavailable: {}", e);
            let message = match e {
                VoiceError::UnsupportedPlatform(_) => {
                    "Voice input is not supported here (set CIDIAN_RECOGNIZER_CMD).".to_string()
                }
                VoiceError::Recognizer(code) => format!("Voice input failed: {code}"),
            };
            app_to_ui_tx.send(AppEvent::ShowError(message)).await?;
            return Ok(());
        }
    }

    let tx = feedback_tx.clone();
    tokio::spawn(async move {
        while let Ok(update) = updates_rx.recv().await {
            let event = match update {
                VoiceUpdate::Partial(text) => AppEvent::LiveTranscript(text),
                VoiceUpdate::Final { transcript, mode } => AppEvent::VoiceFinal { transcript, mode },
                VoiceUpdate::Failed(code) => AppEvent::VoiceFailed(code),
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    Ok(())
}

pub async fn handle_stop_voice(
    state: &AppState,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    if state.voice.stop() {
        app_to_ui_tx
            .send(AppEvent::StatusUpdate("Stopped listening".to_string()))
            .await?;
    }
    Ok(())
}
