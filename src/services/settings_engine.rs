// Video Pocket Settings Engine
// `settings.json` under the platform config dir, edited one dotted key at a time
// (`downloads.buffer_size`, `playback.load_timeout_secs`, ...).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::AppSettings;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<AppSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &AppSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
}

pub struct SettingsEngine {
    path: PathBuf,
    settings: AppSettings,
}

impl SettingsEngine {
    /// Engine for `path_override`, or for `settings.json` in the platform config dir.
    pub fn new(path_override: Option<String>) -> Self {
        let path = path_override
            .map(PathBuf::from)
            .unwrap_or_else(|| platform::get_config_dir().join(SETTINGS_FILE_NAME));
        Self {
            path,
            settings: AppSettings::default(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }
}

/// Turns `downloads.buffer_size` into the JSON pointer `/downloads/buffer_size`.
fn pointer_for(key: &str) -> Result<(String, &str), SettingsError> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty() || s.contains(|c| c == '/' || c == '~')) {
        return Err(SettingsError::InvalidKey(format!("'{}'", key)));
    }
    let (leaf, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Err(SettingsError::InvalidKey(format!("'{}'", key))),
    };
    let parent: String = parents.iter().map(|s| format!("/{}", s)).collect();
    Ok((parent, *leaf))
}

/// Rejects values that deserialize fine but would break the download pipeline.
fn validate(settings: &AppSettings) -> Result<(), SettingsError> {
    let downloads = &settings.downloads;
    if downloads.buffer_size == 0 {
        return Err(SettingsError::InvalidValue("downloads.buffer_size must be positive".into()));
    }
    if downloads.indeterminate_ceiling_bytes == 0 {
        return Err(SettingsError::InvalidValue(
            "downloads.indeterminate_ceiling_bytes must be positive".into(),
        ));
    }
    if !(0.0..=1.0).contains(&downloads.indeterminate_progress_cap) {
        return Err(SettingsError::InvalidValue(
            "downloads.indeterminate_progress_cap must be within 0..=1".into(),
        ));
    }
    if downloads.export_poll_interval_ms == 0 {
        return Err(SettingsError::InvalidValue(
            "downloads.export_poll_interval_ms must be positive".into(),
        ));
    }
    if settings.playback.load_timeout_secs == 0 {
        return Err(SettingsError::InvalidValue("playback.load_timeout_secs must be positive".into()));
    }
    Ok(())
}

impl SettingsEngineTrait for SettingsEngine {
    /// A missing file yields defaults; a malformed or out-of-range one is an error.
    fn load(&mut self) -> Result<AppSettings, SettingsError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No settings file, using defaults");
            self.settings = AppSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| SettingsError::IoError(format!("{}: {}", self.path.display(), e)))?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| SettingsError::SerializationError(format!("{}: {}", self.path.display(), e)))?;
        validate(&settings)?;

        info!(path = %self.path.display(), "Loaded settings");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Writes a sibling temp file and renames it over `settings.json`.
    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::IoError(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| SettingsError::IoError(e.to_string()))?;
        fs::rename(&staging, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            SettingsError::IoError(e.to_string())
        })
    }

    fn get_settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Replaces one value by dotted key, validates the result, then saves.
    /// A whole section can be replaced by its bare name (`"downloads"`).
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let (parent, leaf) = pointer_for(key)?;
        let mut tree = serde_json::to_value(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;

        let slot = tree
            .pointer_mut(&parent)
            .and_then(Value::as_object_mut)
            .and_then(|section| section.get_mut(leaf))
            .ok_or_else(|| SettingsError::InvalidKey(format!("'{}'", key)))?;
        *slot = value;

        let updated: AppSettings = serde_json::from_value(tree)
            .map_err(|e| SettingsError::InvalidValue(format!("{}: {}", key, e)))?;
        validate(&updated)?;

        debug!(key, "Setting updated");
        self.settings = updated;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = AppSettings::default();
        self.save()
    }
}
