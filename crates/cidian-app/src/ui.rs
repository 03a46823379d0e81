use std::fmt::Write as _;
use std::io::Write;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use cidian_config::Config;
use cidian_config::ui::UiConfig;
use cidian_core::sources::EXTERNAL_SOURCES;
use cidian_types::{AppEvent, HistoryItem, LookupMode, NarrationState, WordDefinition};
use kanal::AsyncReceiver;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

pub const HELP: &str = "\
Type a word or phrase to look it up.

  :en / :cn       switch input language
  :say            read the explanation aloud (again to stop)
  :stop           stop narration
  :p              pronounce the word
  :voice          speak your query
  :mute           stop listening
  :history        recent lookups
  :clear          clear history
  :links [word]   dictionary links
  :help           this text
  :q              quit";

/// Terminal renderer: prints whatever the app sends until cancelled
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    config: Arc<RwLock<Config>>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut terminal = Terminal {
        interactive: atty::is(atty::Stream::Stdin),
        mode: LookupMode::default(),
    };

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => return Ok(()),
            },
        };

        let ui = config.read().await.ui.clone();
        terminal.show(&event, &ui)?;
    }

    // Flush whatever was queued before shutdown
    let ui = config.read().await.ui.clone();
    terminal.interactive = false;
    while let Ok(Some(event)) = app_to_ui_rx.try_recv() {
        terminal.show(&event, &ui)?;
    }

    Ok(())
}

struct Terminal {
    interactive: bool,
    mode: LookupMode,
}

impl Terminal {
    fn show(&mut self, event: &AppEvent, ui: &UiConfig) -> anyhow::Result<()> {
        if let AppEvent::ModeChanged(mode) = event {
            self.mode = *mode;
        }

        let Some(text) = render_event(event, ui) else {
            return Ok(());
        };

        let mut out = std::io::stdout().lock();
        writeln!(out, "{text}")?;
        if self.interactive && wants_prompt(event) {
            write!(out, "{}", prompt(self.mode))?;
        }
        out.flush()?;
        Ok(())
    }
}

fn wants_prompt(event: &AppEvent) -> bool {
    !matches!(
        event,
        AppEvent::Loading { .. } | AppEvent::LiveTranscript(_) | AppEvent::NarrationChanged(_)
    )
}

pub fn prompt(mode: LookupMode) -> String {
    format!("[{mode}] > ")
}

/// Text for one event, or `None` for events with nothing to show
pub fn render_event(event: &AppEvent, ui: &UiConfig) -> Option<String> {
    let text = match event {
        AppEvent::Loading { query, mode } => format!("Looking up '{query}' ({mode})..."),
        AppEvent::ShowResult(definition) => {
            let mut text = render_definition(definition, ui);
            if ui.show_links {
                text.push('\n');
                text.push_str(&render_source_names());
            }
            text
        }
        AppEvent::ShowError(message) => format!("! {message}"),
        AppEvent::NarrationFailed(message) => format!("! {message}"),
        AppEvent::StatusUpdate(message) => format!("* {message}"),
        AppEvent::LiveTranscript(text) => format!("~ {text}"),
        AppEvent::NarrationChanged(state) => match state {
            NarrationState::Loading => "* Preparing narration...".to_string(),
            NarrationState::Playing => "* Playing narration (:say again to stop)".to_string(),
            NarrationState::Idle => return None,
        },
        AppEvent::ShowHistory(items) => render_history(items),
        AppEvent::ShowLinks { word, links } => render_links(word, links),
        AppEvent::ModeChanged(mode) => match mode {
            LookupMode::En => "* Mode EN: type English to analyze it".to_string(),
            LookupMode::Cn => "* Mode CN: type Chinese to find the English word".to_string(),
        },
        AppEvent::ShowHelp => HELP.to_string(),
        AppEvent::BackendReady => "Ready. Type :help for commands.".to_string(),
        AppEvent::UiEvent(_)
        | AppEvent::RawTextInput { .. }
        | AppEvent::LookupFinished { .. }
        | AppEvent::VoiceFinal { .. }
        | AppEvent::VoiceFailed(_) => return None,
    };

    Some(text)
}

pub fn render_definition(definition: &WordDefinition, ui: &UiConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}  {}  ({})",
        definition.word, definition.phonetic, definition.part_of_speech
    );
    let _ = writeln!(out, "  {}", definition.definition);
    let _ = writeln!(out, "  {}", definition.chinese_translation);

    if !definition.examples.is_empty() {
        let _ = writeln!(out, "\nExamples");
        for example in definition.examples.iter().take(ui.max_examples) {
            let _ = writeln!(out, "  - {}", example.en);
            let _ = writeln!(out, "    {}", example.cn);
        }
    }

    if !definition.synonyms.is_empty() {
        let _ = writeln!(out, "\nSynonyms: {}", definition.synonyms.join(", "));
    }
    if !definition.antonyms.is_empty() {
        let _ = writeln!(out, "Antonyms: {}", definition.antonyms.join(", "));
    }

    let _ = write!(out, "\nGrammar\n  {}", definition.grammar_notes);
    out
}

fn render_source_names() -> String {
    let names: Vec<&str> = EXTERNAL_SOURCES.iter().map(|source| source.name).collect();
    format!("More: {} (:links)", names.join(" | "))
}

pub fn render_history(items: &[HistoryItem]) -> String {
    if items.is_empty() {
        return "No lookups yet.".to_string();
    }

    let mut out = String::from("Recent lookups");
    for item in items {
        let when = Local
            .timestamp_millis_opt(item.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let _ = write!(out, "\n  {:<24} {}", item.word, when);
    }
    out
}

pub fn render_links(word: &str, links: &[(String, String)]) -> String {
    let mut out = format!("'{word}' elsewhere");
    for (name, url) in links {
        let _ = write!(out, "\n  {name:<22} {url}");
    }
    out
}
