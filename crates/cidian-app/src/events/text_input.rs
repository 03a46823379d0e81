use cidian_types::{LookupMode, UiEvent};

/// Turn one input line into a UI event. Lines starting with `:` are
/// commands; anything else is a search. Blank lines yield nothing.
pub fn parse_line(line: &str) -> Option<UiEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(command) = line.strip_prefix(':') else {
        return Some(UiEvent::Search(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let event = match name.to_ascii_lowercase().as_str() {
        "en" => UiEvent::SetMode(LookupMode::En),
        "cn" | "zh" => UiEvent::SetMode(LookupMode::Cn),
        "say" | "read" | "narrate" => UiEvent::Narrate,
        "stop" => UiEvent::StopNarration,
        "p" | "pronounce" => UiEvent::Pronounce,
        "voice" | "v" => UiEvent::StartVoice,
        "mute" => UiEvent::StopVoice,
        "history" | "h" => UiEvent::History,
        "clear" => UiEvent::ClearHistory,
        "links" | "l" => UiEvent::Links((!arg.is_empty()).then(|| arg.to_string())),
        "help" | "?" => UiEvent::Help,
        "q" | "quit" | "exit" => UiEvent::Close,
        _ => {
            tracing::debug!("Unknown command ':{}'", name);
            UiEvent::Help
        }
    };

    Some(event)
}
