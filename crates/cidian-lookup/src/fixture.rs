//! Canned lookup provider used in tests and offline demos

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cidian_types::{Example, LookupMode, WordDefinition};

use crate::parse::parse_word_definition;
use crate::{LookupClient, LookupError, ProviderMetadata, require_query};

#[derive(Debug, Clone)]
enum Reply {
    Definition(WordDefinition),
    /// Raw provider text, run through the real parse path
    Raw(String),
    Failure(String),
}

#[derive(Debug, Clone)]
struct Fixture {
    reply: Reply,
    delay: Option<Duration>,
}

/// Lookup client answering from fixtures keyed by `(mode, query)`
#[derive(Debug, Default)]
pub struct FixtureLookupClient {
    fixtures: HashMap<(LookupMode, String), Fixture>,
    calls: AtomicUsize,
}

impl FixtureLookupClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(self, mode: LookupMode, query: &str, definition: WordDefinition) -> Self {
        self.insert(mode, query, Reply::Definition(definition))
    }

    pub fn with_raw_payload(self, mode: LookupMode, query: &str, payload: &str) -> Self {
        self.insert(mode, query, Reply::Raw(payload.to_string()))
    }

    pub fn with_failure(self, mode: LookupMode, query: &str, message: &str) -> Self {
        self.insert(mode, query, Reply::Failure(message.to_string()))
    }

    /// Hold the reply for `(mode, query)` back by `delay`
    pub fn with_delay(mut self, mode: LookupMode, query: &str, delay: Duration) -> Self {
        if let Some(fixture) = self.fixtures.get_mut(&(mode, query.to_string())) {
            fixture.delay = Some(delay);
        }
        self
    }

    /// Number of lookups that reached the provider
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn insert(mut self, mode: LookupMode, query: &str, reply: Reply) -> Self {
        self.fixtures
            .insert((mode, query.to_string()), Fixture { reply, delay: None });
        self
    }
}

#[async_trait]
impl LookupClient for FixtureLookupClient {
    async fn lookup(&self, query: &str, mode: LookupMode) -> Result<WordDefinition, LookupError> {
        let query = require_query(query)?;
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(fixture) = self.fixtures.get(&(mode, query.to_string())).cloned() else {
            return Err(LookupError::RequestFailed(format!(
                "no fixture for {mode} '{query}'"
            )));
        };

        if let Some(delay) = fixture.delay {
            tokio::time::sleep(delay).await;
        }

        match fixture.reply {
            Reply::Definition(definition) => Ok(definition),
            Reply::Raw(payload) => parse_word_definition(&payload),
            Reply::Failure(message) => Err(LookupError::RequestFailed(message)),
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Fixture".to_string(),
            model: "fixture".to_string(),
            requires_api_key: false,
        }
    }
}

/// The reference "run" analysis
pub fn run_definition() -> WordDefinition {
    WordDefinition {
        word: "run".to_string(),
        phonetic: "/rʌn/".to_string(),
        part_of_speech: "verb".to_string(),
        definition: "move at a speed faster than a walk, never having both feet on the ground at the same time".to_string(),
        chinese_translation: "跑".to_string(),
        examples: vec![Example {
            en: "I run every morning.".to_string(),
            cn: "我每天早上跑步。".to_string(),
        }],
        synonyms: vec!["jog".to_string(), "sprint".to_string()],
        antonyms: vec!["walk".to_string()],
        grammar_notes: "run 是不规则动词，过去式 ran，过去分词 run。".to_string(),
    }
}
