use std::sync::Arc;

use cidian_core::sources::links_for;
use cidian_core::state::SessionState;
use cidian_types::{AppEvent, UiEvent};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod lookup;
pub mod narrate;
pub mod pronounce;
pub mod text_input;
pub mod voice_input;

use lookup::{handle_lookup_finished, handle_search};
use narrate::{handle_narrate, handle_stop};
use pronounce::handle_pronounce;
use text_input::parse_line;
use voice_input::{handle_start_voice, handle_stop_voice};

/// App's main loop. Owns the session; every state change happens here.
///
/// `feedback_tx` is the sending half of `ui_to_app_rx`, used by background
/// work (lookups, voice input) to report back.
pub async fn event_loop(
    state: Arc<AppState>,
    mut session: SessionState,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    feedback_tx: AsyncSender<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    app_to_ui_tx.send(AppEvent::ModeChanged(session.mode)).await?;
    app_to_ui_tx.send(AppEvent::BackendReady).await?;

    tracing::debug!("Event loop started");
    let mut closing = false;
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = ui_to_app_rx.recv() => event?,
        };

        tracing::trace!("Event received: {:?}", std::mem::discriminant(&event));
        let keep_running = handle_events(
            &state,
            &mut session,
            &feedback_tx,
            &app_to_ui_tx,
            event,
        )
        .await?;

        closing |= !keep_running;
        // Piped input ends before its lookups do
        if closing && !session.loading {
            cancel.cancel();
            break;
        }
    }

    state.narration.stop();
    state.voice.stop();
    tracing::debug!("Event loop stopped");
    Ok(())
}

/// Returns `false` once the user asked to quit
async fn handle_events(
    state: &AppState,
    session: &mut SessionState,
    feedback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<bool> {
    match event {
        AppEvent::RawTextInput { text, source } => {
            tracing::debug!("{:?} input: {} chars", source, text.chars().count());
            if let Some(ui_event) = parse_line(&text) {
                return handle_ui_event(state, session, feedback_tx, app_to_ui_tx, ui_event).await;
            }
        }
        AppEvent::UiEvent(ui_event) => {
            return handle_ui_event(state, session, feedback_tx, app_to_ui_tx, ui_event).await;
        }
        AppEvent::LookupFinished { generation, result } => {
            handle_lookup_finished(state, session, generation, result, app_to_ui_tx).await?;
        }
        AppEvent::LiveTranscript(text) => {
            session.live_transcript = text.clone();
            app_to_ui_tx.send(AppEvent::LiveTranscript(text)).await?;
        }
        AppEvent::VoiceFinal { transcript, mode } => {
            handle_search(state, session, &transcript, Some(mode), feedback_tx, app_to_ui_tx).await?;
        }
        AppEvent::VoiceFailed(code) => {
            session.live_transcript.clear();
            app_to_ui_tx
                .send(AppEvent::ShowError(format!("Voice input error: {code}")))
                .await?;
        }
        // UI-only events
        AppEvent::NarrationChanged(_)
        | AppEvent::NarrationFailed(_)
        | AppEvent::Loading { .. }
        | AppEvent::ShowResult(_)
        | AppEvent::ShowHistory(_)
        | AppEvent::ShowLinks { .. }
        | AppEvent::ModeChanged(_)
        | AppEvent::StatusUpdate(_)
        | AppEvent::ShowError(_)
        | AppEvent::ShowHelp
        | AppEvent::BackendReady => {}
    }

    Ok(true)
}

async fn handle_ui_event(
    state: &AppState,
    session: &mut SessionState,
    feedback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: UiEvent,
) -> anyhow::Result<bool> {
    match event {
        UiEvent::Search(query) => {
            handle_search(state, session, &query, None, feedback_tx, app_to_ui_tx).await?;
        }
        UiEvent::SetMode(mode) => {
            session.set_mode(mode);
            tracing::info!("Lookup mode: {}", mode);
            app_to_ui_tx.send(AppEvent::ModeChanged(mode)).await?;
        }
        UiEvent::Narrate => handle_narrate(state, session, app_to_ui_tx).await?,
        UiEvent::StopNarration => handle_stop(state, app_to_ui_tx).await?,
        UiEvent::Pronounce => handle_pronounce(state, session, app_to_ui_tx).await?,
        UiEvent::StartVoice => {
            handle_start_voice(state, session.mode, feedback_tx, app_to_ui_tx).await?;
        }
        UiEvent::StopVoice => handle_stop_voice(state, app_to_ui_tx).await?,
        UiEvent::History => {
            app_to_ui_tx
                .send(AppEvent::ShowHistory(session.history.items().to_vec()))
                .await?;
        }
        UiEvent::ClearHistory => {
            session.history.clear();
            app_to_ui_tx
                .send(AppEvent::StatusUpdate("History cleared".to_string()))
                .await?;
        }
        UiEvent::Links(word) => {
            let word = word.or_else(|| session.result.as_ref().map(|d| d.word.clone()));
            match word {
                Some(word) => {
                    let links = links_for(&word);
                    app_to_ui_tx.send(AppEvent::ShowLinks { word, links }).await?;
                }
                None => {
                    app_to_ui_tx
                        .send(AppEvent::ShowError("Look up a word first.".to_string()))
                        .await?;
                }
            }
        }
        UiEvent::Help => app_to_ui_tx.send(AppEvent::ShowHelp).await?,
        UiEvent::Close => {
            tracing::info!("Close requested");
            return Ok(false);
        }
    }

    Ok(true)
}
