pub mod settings;

pub use settings::{DebugLogRotation, Settings};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Comma separated API keys, replacing `api_keys` from the file
pub const API_KEYS_ENV: &str = "RANKCHECK_API_KEYS";
/// Comma separated search engine ids, replacing `search_engine_ids` from the file
pub const SEARCH_ENGINE_IDS_ENV: &str = "RANKCHECK_SEARCH_ENGINE_IDS";

/// Get the default configuration file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("rankcheck");

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from `path` (or the default location), creating a
/// template if the file does not exist yet. Environment overrides are applied.
pub fn load_or_create_config(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };

    let mut settings = if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?
    } else {
        let settings = Settings::default();
        save_config(&path, &settings)?;

        println!("Created default config at: {}", path.display());
        println!("Please edit this file to add your API keys and search engine ids.");

        settings
    };

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    validate(&settings)?;
    Ok(settings)
}

/// Parse a TOML settings document
pub fn parse_config(content: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(content)?;
    Ok(settings)
}

/// Save configuration to file
pub fn save_config(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("Failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

/// Replace credential lists from the environment, when set.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(keys) = lookup(API_KEYS_ENV) {
        settings.api_keys = split_list(&keys);
    }
    if let Some(ids) = lookup(SEARCH_ENGINE_IDS_ENV) {
        settings.search_engine_ids = split_list(&ids);
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate(settings: &Settings) -> Result<()> {
    if settings.timeout_secs == 0 {
        anyhow::bail!("timeout_secs must be greater than 0");
    }
    if settings.endpoint.trim().is_empty() {
        anyhow::bail!("endpoint must not be empty");
    }
    Ok(())
}
