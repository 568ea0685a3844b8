use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::validation::{ValidationRules, DEFAULT_MIN_PASSWORD_LEN};

pub const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub min_password_len: usize,
    pub preferences_path: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".into(),
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
            preferences_path: PathBuf::from("./data/preferences.toml"),
        }
    }
}

impl ClientSettings {
    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            min_password_len: self.min_password_len,
        }
    }

    pub fn validated(self) -> Result<Self> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api_base_url '{}'", self.api_base_url))?;
        Ok(self)
    }
}

pub fn load_settings() -> ClientSettings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_with(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file, then environment overrides.
pub fn load_settings_with(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("min_password_len") {
                if let Ok(parsed) = v.parse::<usize>() {
                    settings.min_password_len = parsed;
                }
            }
            if let Some(v) = file_cfg.get("preferences_path") {
                settings.preferences_path = PathBuf::from(v);
            }
        }
    }

    if let Some(v) = env("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__MIN_PASSWORD_LEN") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.min_password_len = parsed;
        }
    }

    if let Some(v) = env("APP__PREFERENCES_PATH") {
        settings.preferences_path = PathBuf::from(v);
    }

    settings
}
