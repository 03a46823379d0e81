use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cidian_config::Config;
use cidian_config::history::HistoryConfig;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "cidian";
const HISTORY_FILE: &str = "history.json";

fn profiles_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("profiles"))
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Load a user profile by name, falling back to `main` and then to the
/// environment-derived defaults.
pub fn load_user_profile(name: &str) -> anyhow::Result<Config> {
    let Some(dir) = profiles_dir() else {
        tracing::warn!("No config directory on this platform, using defaults");
        return Ok(Config::new());
    };

    load_from_dir(&dir, name)
}

fn load_from_dir(dir: &Path, name: &str) -> anyhow::Result<Config> {
    let profile_file = dir.join(format!("{name}.json"));
    let main_file = dir.join("main.json");

    let file = if profile_file.exists() {
        profile_file
    } else if main_file.exists() {
        tracing::warn!("Profile {name} not found, falling back to main profile");
        main_file
    } else {
        tracing::debug!("No profiles in {}, using defaults", dir.display());
        return Ok(Config::new());
    };

    let data = fs::read_to_string(&file)
        .with_context(|| format!("failed to read profile {}", file.display()))?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("invalid profile {}", file.display()))?;

    // Credentials never live in profiles
    let mut config = profile.value;
    config.lookup.apply_env_credentials();
    tracing::info!("Loaded profile '{}'", profile.name);
    Ok(config)
}

/// History file: the configured override, else `<data_dir>/cidian/history.json`.
/// `None` keeps history in memory only.
pub fn history_path(config: &HistoryConfig) -> Option<PathBuf> {
    if let Some(path) = config.path.as_deref().filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }

    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(HISTORY_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save_to_dir(dir: &Path, name: &str, config: &Config) -> PathBuf {
        let profile = Profile {
            name: name.into(),
            value: config.clone(),
        };
        let file = dir.join(format!("{name}.json"));
        fs::write(&file, serde_json::to_string_pretty(&profile).unwrap()).unwrap();
        file
    }

    #[test]
    fn missing_profile_falls_back_to_main() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.lookup.voice = "Puck".to_string();
        config.ui.max_examples = 2;
        save_to_dir(dir.path(), "main", &config);

        let loaded = load_from_dir(dir.path(), "travel").unwrap();

        assert_eq!(loaded.lookup.voice, "Puck");
        assert_eq!(loaded.ui.max_examples, 2);
    }

    #[test]
    fn saved_profile_has_no_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.lookup.api_key = "secret-key".to_string();

        let file = save_to_dir(dir.path(), "main", &config);

        let data = fs::read_to_string(file).unwrap();
        assert!(!data.contains("secret-key"));
    }

    #[test]
    fn history_override_wins() {
        let config = HistoryConfig {
            path: Some("/tmp/cidian-history.json".to_string()),
        };
        assert_eq!(
            history_path(&config),
            Some(PathBuf::from("/tmp/cidian-history.json"))
        );
    }
}
