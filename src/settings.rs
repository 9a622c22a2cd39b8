use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::{
    clock::{ClockMode, DEFAULT_TICK},
    timeline::Capabilities,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSettings {
    pub tick_millis: u64,
    pub clock_mode: ClockMode,
    pub capabilities: Capabilities,
    /// Schedule file; the bundled schedule when absent.
    pub schedule_path: Option<PathBuf>,
    /// Recording to play alongside the timeline.
    pub audio_path: Option<PathBuf>,
    pub viewport_width: u16,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            tick_millis: DEFAULT_TICK.as_millis() as u64,
            clock_mode: ClockMode::default(),
            capabilities: Capabilities::default(),
            schedule_path: None,
            audio_path: None,
            viewport_width: 80,
        }
    }
}

impl PlayerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<PlayerSettings>,
}

impl SettingsStore {
    /// Loads settings from `path`. A missing or unreadable-as-JSON file falls
    /// back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed settings in {}: {err}", path.display());
                PlayerSettings::default()
            })
        } else {
            PlayerSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> PlayerSettings {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update(&self, settings: PlayerSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &PlayerSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("tangent-tally-settings-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = SettingsStore::new(scratch_path()).unwrap();
        let settings = store.settings();
        assert_eq!(settings, PlayerSettings::default());
        assert_eq!(settings.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn update_persists_across_reopen() {
        let path = scratch_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        let mut settings = store.settings();
        settings.clock_mode = ClockMode::WallClock;
        settings.capabilities.bar_chart = false;
        settings.tick_millis = 50;
        store.update(settings.clone()).unwrap();

        let reopened = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reopened.settings(), settings);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_and_malformed_files() {
        let path = scratch_path();
        fs::write(&path, r#"{"clockMode": "wallClock"}"#).unwrap();
        let settings = SettingsStore::new(path.clone()).unwrap().settings();
        assert_eq!(settings.clock_mode, ClockMode::WallClock);
        assert_eq!(settings.viewport_width, 80);

        fs::write(&path, "not json").unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.settings(), PlayerSettings::default());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn zero_tick_is_clamped() {
        let settings = PlayerSettings {
            tick_millis: 0,
            ..PlayerSettings::default()
        };
        assert_eq!(settings.tick_interval(), Duration::from_millis(1));
    }
}
