//! Persisted UI preferences.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use shared::domain::Theme;
use tracing::debug;

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub fn load_theme(store: &dyn PreferenceStore) -> Result<Theme> {
    Ok(store
        .get(Theme::STORAGE_KEY)?
        .map(|raw| Theme::parse_or_default(&raw))
        .unwrap_or_default())
}

pub fn save_theme(store: &dyn PreferenceStore, theme: Theme) -> Result<()> {
    store.set(Theme::STORAGE_KEY, theme.storage_value())
}

pub fn toggle_theme(store: &dyn PreferenceStore) -> Result<Theme> {
    let next = load_theme(store)?.toggled();
    save_theme(store, next)?;
    debug!(theme = next.as_str(), "preferences: theme toggled");
    Ok(next)
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .values
            .lock()
            .map_err(|_| anyhow!("preference store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .values
            .lock()
            .map_err(|_| anyhow!("preference store lock poisoned"))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat `key = "value"` TOML file, rewritten on every `set`.
pub struct FilePreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read preferences '{}'", self.path.display())
                })
            }
        };
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse preferences '{}'", self.path.display()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("preference file lock poisoned"))?;
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directory '{}' for preferences",
                    parent.display()
                )
            })?;
        }
        let raw = toml::to_string(&values).context("failed to encode preferences")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write preferences '{}'", self.path.display()))?;
        Ok(())
    }
}
