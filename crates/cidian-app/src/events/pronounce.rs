use cidian_core::state::SessionState;
use cidian_types::AppEvent;
use kanal::AsyncSender;

use crate::state::AppState;

pub async fn handle_pronounce(
    state: &AppState,
    session: &SessionState,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let Some(word) = session.result.as_ref().map(|definition| definition.word.as_str()) else {
        app_to_ui_tx
            .send(AppEvent::ShowError("Look up a word first.".to_string()))
            .await?;
        return Ok(());
    };

    if let Err(e) = state.pronouncer.pronounce(word) {
        tracing::warn!("Pronunciation failed: {}", e);
        app_to_ui_tx.send(AppEvent::ShowError(e.user_message())).await?;
    }

    Ok(())
}
