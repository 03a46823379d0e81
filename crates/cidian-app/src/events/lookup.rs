use std::sync::Arc;

use cidian_core::state::{LookupApplied, LookupTicket, SessionState};
use cidian_lookup::LookupClient;
use cidian_types::{AppEvent, LookupMode, WordDefinition};
use kanal::AsyncSender;

use crate::state::AppState;

/// Issue a lookup for `raw`. The result comes back to the event loop as
/// [`AppEvent::LookupFinished`]; `mode` overrides the session mode when the
/// query came from a recognizer listening in a specific language.
pub async fn handle_search(
    state: &AppState,
    session: &mut SessionState,
    raw: &str,
    mode: Option<LookupMode>,
    feedback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let Some(mut ticket) = session.begin_lookup(raw) else {
        tracing::debug!("Ignoring blank query");
        return Ok(());
    };
    if let Some(mode) = mode {
        ticket.mode = mode;
    }

    tracing::info!(
        "Lookup #{}: '{}' ({})",
        ticket.generation,
        ticket.query,
        ticket.mode
    );
    app_to_ui_tx
        .send(AppEvent::Loading {
            query: ticket.query.clone(),
            mode: ticket.mode,
        })
        .await?;

    spawn_lookup(state.lookup.clone(), ticket, feedback_tx.clone());
    Ok(())
}

fn spawn_lookup(client: Arc<dyn LookupClient>, ticket: LookupTicket, tx: AsyncSender<AppEvent>) {
    tokio::spawn(async move {
        let result = run_lookup(client.as_ref(), &ticket.query, ticket.mode).await;
        if let Err(e) = tx
            .send(AppEvent::LookupFinished {
                generation: ticket.generation,
                result,
            })
            .await
        {
            tracing::warn!("Lookup #{} finished after shutdown: {}", ticket.generation, e);
        }
    });
}

/// Call the provider, mapping failures to their user-facing message
pub async fn run_lookup(
    client: &dyn LookupClient,
    query: &str,
    mode: LookupMode,
) -> Result<WordDefinition, String> {
    client.lookup(query, mode).await.map_err(|e| {
        tracing::error!("Lookup of '{}' failed: {}", query, e);
        e.user_message()
    })
}

pub async fn handle_lookup_finished(
    state: &AppState,
    session: &mut SessionState,
    generation: u64,
    result: Result<WordDefinition, String>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    match session.complete_lookup(generation, result) {
        LookupApplied::Shown => {
            // Narration belongs to the previous result
            if state.narration.stop() {
                tracing::debug!("Stopped narration of the previous result");
            }
            if let Some(definition) = session.result.clone() {
                app_to_ui_tx.send(AppEvent::ShowResult(definition)).await?;
            }
        }
        LookupApplied::Failed => {
            let message = session.error.clone().unwrap_or_default();
            app_to_ui_tx.send(AppEvent::ShowError(message)).await?;
        }
        LookupApplied::Stale => {}
    }

    Ok(())
}
