use std::env;

use serde::{Deserialize, Serialize};

use self::history::HistoryConfig;
use self::lookup::LookupConfig;
use self::speech::SpeechConfig;
use self::ui::UiConfig;

pub mod history;
pub mod lookup;
pub mod speech;
pub mod ui;

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub lookup: LookupConfig,
    pub speech: SpeechConfig,
    pub history: HistoryConfig,
    pub ui: UiConfig,

    /// Capacity of the input -> app channel
    pub input_channel_capacity: usize,
    /// Capacity of the app -> ui channel
    pub output_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            speech: SpeechConfig::default(),
            history: HistoryConfig::default(),
            ui: UiConfig::default(),

            input_channel_capacity: 64,
            output_channel_capacity: 256,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let input_channel_capacity = env::var("INPUT_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(64);

        let output_channel_capacity = env::var("OUTPUT_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);

        Config {
            lookup: LookupConfig::new(),
            speech: SpeechConfig::new(),
            history: HistoryConfig::new(),
            ui: UiConfig::default(),

            input_channel_capacity,
            output_channel_capacity,
        }
    }
}
