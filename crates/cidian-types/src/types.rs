use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum AppEvent {
    UiEvent(UiEvent),
    RawTextInput {
        text: String,
        source: TextSource,
    },
    LookupFinished {
        generation: u64,
        result: Result<WordDefinition, String>,
    },
    LiveTranscript(String),
    VoiceFinal {
        transcript: String,
        mode: LookupMode,
    },
    VoiceFailed(String),
    NarrationChanged(NarrationState),
    NarrationFailed(String),
    Loading {
        query: String,
        mode: LookupMode,
    },
    ShowResult(WordDefinition),
    ShowHistory(Vec<HistoryItem>),
    ShowLinks {
        word: String,
        links: Vec<(String, String)>,
    },
    ModeChanged(LookupMode),
    StatusUpdate(String),
    ShowError(String),
    ShowHelp,
    BackendReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Keyboard,
    /// Piped or redirected input
    Stream,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Search(String),
    SetMode(LookupMode),
    Narrate,
    StopNarration,
    Pronounce,
    StartVoice,
    StopVoice,
    History,
    ClearHistory,
    Links(Option<String>),
    Help,
    Close,
}

/// Direction of a lookup: which language the user typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Input is English; analyze it
    #[default]
    En,
    /// Input is Chinese; find the best English equivalent and analyze that
    Cn,
}

impl LookupMode {
    /// Locale tag the recognizer listens with
    pub fn recognizer_locale(self) -> &'static str {
        match self {
            LookupMode::En => "en-US",
            LookupMode::Cn => "zh-CN",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LookupMode::En => LookupMode::Cn,
            LookupMode::Cn => LookupMode::En,
        }
    }
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMode::En => f.write_str("EN"),
            LookupMode::Cn => f.write_str("CN"),
        }
    }
}

impl FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(LookupMode::En),
            "cn" | "zh" | "chinese" => Ok(LookupMode::Cn),
            other => Err(format!("unknown lookup mode '{other}' (expected en or cn)")),
        }
    }
}

/// Structured lexical analysis of one headword.
///
/// Every string field is required on the wire: a payload missing any of them
/// (or carrying `null`) fails to deserialize as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDefinition {
    pub word: String,
    pub phonetic: String,
    pub part_of_speech: String,
    pub definition: String,
    pub chinese_translation: String,
    pub examples: Vec<Example>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    pub grammar_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub en: String,
    pub cn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub word: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Dictionary website that can be linked to for a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalSource {
    pub name: &'static str,
    pub url_prefix: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrationState {
    #[default]
    Idle,
    Loading,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VoiceState {
    #[default]
    Idle,
    Listening,
    Finalizing,
    /// Platform-reported error code for the current attempt
    Error(String),
}
