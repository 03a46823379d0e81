use std::env;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct HistoryConfig {
    /// Override for the history file; the data directory is used when unset
    pub path: Option<String>,
}

impl HistoryConfig {
    pub fn new() -> Self {
        Self {
            path: env::var("CIDIAN_HISTORY_PATH").ok().filter(|p| !p.is_empty()),
        }
    }
}
