use cidian_core::state::SessionState;
use cidian_speech::{NarrationBridge, NarrationOutcome};
use cidian_types::{AppEvent, NarrationState};
use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Toggle narration of the displayed result. Generation runs in the
/// background so the event loop keeps serving input.
pub async fn handle_narrate(
    state: &AppState,
    session: &SessionState,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let Some(definition) = session.result.clone() else {
        app_to_ui_tx
            .send(AppEvent::ShowError("Look up a word first.".to_string()))
            .await?;
        return Ok(());
    };

    let bridge = state.narration.clone();
    let tx = app_to_ui_tx.clone();
    tokio::spawn(async move {
        let event = match bridge.toggle(&definition).await {
            Ok(NarrationOutcome::Started) => return,
            Ok(NarrationOutcome::Stopped) => AppEvent::StatusUpdate("Narration stopped".to_string()),
            Ok(NarrationOutcome::Busy) => {
                AppEvent::StatusUpdate("Narration is still loading".to_string())
            }
            Err(e) => {
                tracing::error!("Narration failed: {}", e);
                AppEvent::NarrationFailed(e.user_message())
            }
        };
        let _ = tx.send(event).await;
    });

    Ok(())
}

pub async fn handle_stop(state: &AppState, app_to_ui_tx: &AsyncSender<AppEvent>) -> anyhow::Result<()> {
    if state.narration.stop() {
        app_to_ui_tx
            .send(AppEvent::StatusUpdate("Narration stopped".to_string()))
            .await?;
    }
    Ok(())
}

/// Mirror narration state changes to the UI until cancelled
pub async fn forward_narration_state(
    bridge: NarrationBridge,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut rx = bridge.subscribe();
    let mut last = *rx.borrow_and_update();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current: NarrationState = *rx.borrow_and_update();
                if current != last {
                    last = current;
                    app_to_ui_tx.send(AppEvent::NarrationChanged(current)).await?;
                }
            }
        }
    }

    Ok(())
}
