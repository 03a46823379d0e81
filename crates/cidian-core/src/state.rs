use cidian_types::{LookupMode, WordDefinition};

use crate::history::HistoryStore;
use crate::preprocess::{DefaultPreprocessor, Preprocessor};

/// Handle for one issued lookup. Only the most recently issued ticket's
/// result is ever applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub generation: u64,
    pub query: String,
    pub mode: LookupMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupApplied {
    /// Result displayed and recorded in history
    Shown,
    /// Error message displayed
    Failed,
    /// A newer lookup was issued since; result dropped
    Stale,
}

/// Per-session application state, owned by the event loop
pub struct SessionState {
    pub mode: LookupMode,
    pub query: String,
    pub loading: bool,
    pub result: Option<WordDefinition>,
    pub error: Option<String>,
    pub live_transcript: String,
    pub history: HistoryStore,
    generation: u64,
}

impl SessionState {
    pub fn new(history: HistoryStore, mode: LookupMode) -> Self {
        Self {
            mode,
            query: String::new(),
            loading: false,
            result: None,
            error: None,
            live_transcript: String::new(),
            history,
            generation: 0,
        }
    }

    pub fn set_mode(&mut self, mode: LookupMode) {
        self.mode = mode;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a lookup of `raw` under the active mode. Blank input issues nothing.
    pub fn begin_lookup(&mut self, raw: &str) -> Option<LookupTicket> {
        let query = DefaultPreprocessor.process(raw);
        if query.is_empty() {
            return None;
        }

        self.generation += 1;
        self.query = query.clone();
        self.loading = true;
        self.error = None;
        self.live_transcript.clear();

        Some(LookupTicket {
            generation: self.generation,
            query,
            mode: self.mode,
        })
    }

    /// Apply the outcome of the lookup issued as `generation`
    pub fn complete_lookup(
        &mut self,
        generation: u64,
        outcome: Result<WordDefinition, String>,
    ) -> LookupApplied {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale lookup result (generation {} < {})",
                generation,
                self.generation
            );
            return LookupApplied::Stale;
        }

        self.loading = false;

        match outcome {
            Ok(definition) => {
                self.history.record(&definition.word);
                self.result = Some(definition);
                self.error = None;
                LookupApplied::Shown
            }
            Err(message) => {
                self.error = Some(message);
                LookupApplied::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(word: &str) -> WordDefinition {
        WordDefinition {
            word: word.to_string(),
            phonetic: String::new(),
            part_of_speech: "noun".to_string(),
            definition: String::new(),
            chinese_translation: String::new(),
            examples: vec![],
            synonyms: vec![],
            antonyms: vec![],
            grammar_notes: String::new(),
        }
    }

    fn state() -> SessionState {
        SessionState::new(HistoryStore::in_memory(), LookupMode::En)
    }

    #[test]
    fn blank_query_issues_nothing() {
        let mut state = state();
        assert!(state.begin_lookup("   ").is_none());
        assert!(!state.loading);
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn ticket_carries_active_mode_and_clean_query() {
        let mut state = state();
        state.set_mode(LookupMode::Cn);

        let ticket = state.begin_lookup("  跑步 \n").unwrap();
        assert_eq!(ticket.query, "跑步");
        assert_eq!(ticket.mode, LookupMode::Cn);
        assert!(state.loading);
    }

    #[test]
    fn success_shows_and_records_canonical_word() {
        let mut state = state();
        let ticket = state.begin_lookup("running").unwrap();

        let applied = state.complete_lookup(ticket.generation, Ok(definition("run")));

        assert_eq!(applied, LookupApplied::Shown);
        assert!(!state.loading);
        assert_eq!(state.result.as_ref().unwrap().word, "run");
        assert_eq!(state.history.items()[0].word, "run");
    }

    #[test]
    fn failure_keeps_history_untouched() {
        let mut state = state();
        let ticket = state.begin_lookup("run").unwrap();

        let applied = state.complete_lookup(ticket.generation, Err("try again".to_string()));

        assert_eq!(applied, LookupApplied::Failed);
        assert!(state.history.is_empty());
        assert!(state.result.is_none());
        assert_eq!(state.error.as_deref(), Some("try again"));
    }

    #[test]
    fn older_ticket_resolving_last_is_dropped() {
        let mut state = state();
        let first = state.begin_lookup("walk").unwrap();
        let second = state.begin_lookup("run").unwrap();

        assert_eq!(
            state.complete_lookup(second.generation, Ok(definition("run"))),
            LookupApplied::Shown
        );
        assert_eq!(
            state.complete_lookup(first.generation, Ok(definition("walk"))),
            LookupApplied::Stale
        );

        assert_eq!(state.result.as_ref().unwrap().word, "run");
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn new_lookup_clears_previous_error() {
        let mut state = state();
        let ticket = state.begin_lookup("x").unwrap();
        state.complete_lookup(ticket.generation, Err("bad".to_string()));

        state.begin_lookup("run").unwrap();
        assert!(state.error.is_none());
    }
}
