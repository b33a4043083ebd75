use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// User-facing toggles. Defaults mirror a fresh install.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusSettings {
    pub notification_rules: bool,
    pub auto_dark_mode: bool,
    pub focus_reminders: bool,
    pub strict_mode: bool,
    pub ai_enabled: bool,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            notification_rules: true,
            auto_dark_mode: true,
            focus_reminders: true,
            strict_mode: false,
            ai_enabled: true,
        }
    }
}

/// JSON-file-backed settings store. Unreadable or malformed files fall back
/// to defaults rather than failing startup.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<FocusSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            FocusSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> FocusSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, settings: FocusSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &FocusSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.get(), FocusSettings::default());
    }

    #[test]
    fn update_round_trips_through_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        let mut settings = store.get();
        settings.strict_mode = true;
        settings.ai_enabled = false;
        store.update(settings.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.get(), settings);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.get(), FocusSettings::default());
    }
}
