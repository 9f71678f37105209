use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::settings::BotSettings;
use crate::error::Result;

pub fn default_settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("suit_mirror_bot");
    path.push("settings.json");
    path
}

/// Missing or invalid files fall back to defaults.
pub fn load_settings(path: &Path) -> BotSettings {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings not readable, using defaults");
            return BotSettings::default();
        }
    };
    match serde_json::from_str::<BotSettings>(&raw) {
        Ok(settings) => {
            info!(path = %path.display(), "settings loaded");
            settings.normalized()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings invalid, using defaults");
            BotSettings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &BotSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
