//! One-shot subcommands; the interactive shell lives in the controller.

use std::time::Duration;

use anyhow::{Context, bail};
use cidian_core::sources::links_for;
use cidian_core::state::LookupApplied;
use cidian_speech::{NarrationOutcome, VoiceUpdate};
use cidian_types::{LookupMode, NarrationState};

use crate::events::lookup::run_lookup;
use crate::state::AppState;
use crate::ui::{render_definition, render_history, render_links};

/// How long a voice query may take before giving up
const VOICE_TIMEOUT: Duration = Duration::from_secs(60);

pub struct LookupOptions {
    pub mode: LookupMode,
    pub narrate: bool,
    pub pronounce: bool,
    pub json: bool,
}

pub async fn lookup(state: &AppState, query: &str, options: LookupOptions) -> anyhow::Result<()> {
    let mut session = state.open_session(options.mode).await;
    let Some(ticket) = session.begin_lookup(query) else {
        bail!("nothing to look up");
    };

    let result = run_lookup(state.lookup.as_ref(), &ticket.query, ticket.mode).await;
    if session.complete_lookup(ticket.generation, result) != LookupApplied::Shown {
        bail!(session.error.clone().unwrap_or_default());
    }
    let Some(definition) = session.result.clone() else {
        bail!("lookup produced no result");
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&definition)?);
    } else {
        let ui = state.config.read().await.ui.clone();
        println!("{}", render_definition(&definition, &ui));
        if ui.show_links {
            println!("\n{}", render_links(&definition.word, &links_for(&definition.word)));
        }
    }

    if options.pronounce
        && let Err(e) = state.pronouncer.pronounce(&definition.word)
    {
        eprintln!("! {}", e.user_message());
    }

    if options.narrate {
        narrate_to_end(state, &definition).await?;
    }

    Ok(())
}

/// Play the narration and wait for it to finish, or for Ctrl+C
async fn narrate_to_end(
    state: &AppState,
    definition: &cidian_types::WordDefinition,
) -> anyhow::Result<()> {
    let mut rx = state.narration.subscribe();

    match state.narration.toggle(definition).await {
        Ok(NarrationOutcome::Started) => {}
        Ok(outcome) => {
            tracing::debug!("Narration did not start: {:?}", outcome);
            return Ok(());
        }
        Err(e) => bail!(e.user_message()),
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            state.narration.stop();
        }
        result = rx.wait_for(|s| *s == NarrationState::Idle) => {
            result.context("narration state closed")?;
        }
    }

    Ok(())
}

pub async fn history(state: &AppState, json: bool) -> anyhow::Result<()> {
    let session = state.open_session(LookupMode::default()).await;
    let items = session.history.items();

    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        println!("{}", render_history(items));
    }
    Ok(())
}

pub fn links(word: &str) -> anyhow::Result<()> {
    let word = word.trim();
    if word.is_empty() {
        bail!("no word given");
    }
    println!("{}", render_links(word, &links_for(word)));
    Ok(())
}

/// Listen for one spoken query, then look it up
pub async fn voice(state: &AppState, options: LookupOptions) -> anyhow::Result<()> {
    let (tx, rx) = kanal::bounded_async(32);
    state
        .voice
        .start(options.mode, tx)
        .await
        .context("voice input unavailable (set CIDIAN_RECOGNIZER_CMD)")?;
    eprintln!("Listening ({})...", options.mode.recognizer_locale());

    let transcript = tokio::time::timeout(VOICE_TIMEOUT, async {
        loop {
            match rx.recv().await {
                Ok(VoiceUpdate::Partial(text)) => eprintln!("~ {text}"),
                Ok(VoiceUpdate::Final { transcript, .. }) => return Ok(transcript),
                Ok(VoiceUpdate::Failed(code)) => bail!("voice input error: {code}"),
                Err(_) => bail!("recognizer stopped without a result"),
            }
        }
    })
    .await;

    let transcript = match transcript {
        Ok(result) => result?,
        Err(_) => {
            state.voice.stop();
            bail!("no speech within {}s", VOICE_TIMEOUT.as_secs());
        }
    };

    lookup(state, &transcript, options).await
}
