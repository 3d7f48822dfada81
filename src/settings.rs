use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceSettings {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8600".into(),
            request_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    /// A room session with no sync for this long is considered abandoned
    /// and swept to Failed by the reaper.
    pub session_timeout_secs: u64,
    pub reaper_interval_secs: u64,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            session_timeout_secs: 30 * 60,
            reaper_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineSettings {
    #[serde(default)]
    inference: InferenceSettings,
    #[serde(default)]
    room: RoomSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn inference(&self) -> InferenceSettings {
        self.data.read().unwrap().inference.clone()
    }

    pub fn room(&self) -> RoomSettings {
        self.data.read().unwrap().room.clone()
    }

    pub fn update_inference(&self, settings: InferenceSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.inference = settings;
        self.persist(&guard)
    }

    pub fn update_room(&self, settings: RoomSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.room = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("formsense_settings_{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = SettingsStore::new(temp_path()).unwrap();
        assert_eq!(store.room().session_timeout_secs, 30 * 60);
        assert_eq!(store.inference().request_timeout_ms, 5_000);
    }

    #[test]
    fn updates_round_trip_through_disk() {
        let path = temp_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_room(RoomSettings {
                session_timeout_secs: 90,
                reaper_interval_secs: 5,
            })
            .unwrap();

        let reopened = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reopened.room().session_timeout_secs, 90);
        let _ = fs::remove_file(path);
    }
}
