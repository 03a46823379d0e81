use serde::{Deserialize, Serialize};

fn default_max_examples() -> usize {
    5
}

fn default_show_links() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct UiConfig {
    /// Examples rendered per result
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
    /// Print dictionary links under each result
    #[serde(default = "default_show_links")]
    pub show_links: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_examples: default_max_examples(),
            show_links: default_show_links(),
        }
    }
}
