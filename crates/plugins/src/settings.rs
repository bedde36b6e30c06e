//! Per-plugin settings persistence.
//!
//! Every plugin owns one JSON object. Loading always starts from the
//! plugin's compile-time defaults and overlays whatever keys the persisted
//! record holds, so a missing or broken file can never drop a default key.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::error::PluginError;

/// A plugin's settings object.
pub type SettingsRecord = serde_json::Map<String, Value>;

/// Name of the settings file inside a plugin's directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Durable settings storage.
///
/// Implementations never fail a load: unreadable or malformed records are
/// logged and the defaults are returned.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the settings for a plugin merged over `defaults`.
    async fn load(&self, plugin_id: &str, defaults: &SettingsRecord) -> SettingsRecord;

    /// Persist the full record for a plugin.
    async fn save(&self, plugin_id: &str, record: &SettingsRecord) -> Result<(), PluginError>;
}

/// Overlay `persisted` onto a copy of `defaults`.
#[must_use]
pub fn merge_over_defaults(defaults: &SettingsRecord, persisted: SettingsRecord) -> SettingsRecord {
    let mut merged = defaults.clone();
    for (key, value) in persisted {
        merged.insert(key, value);
    }
    merged
}

/// Settings stored as `<root>/<plugin id>/settings.json`.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    root: PathBuf,
}

impl FileSettingsStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the settings file for a plugin.
    ///
    /// Returns `None` for ids that would escape the settings root.
    #[must_use]
    pub fn path_for(&self, plugin_id: &str) -> Option<PathBuf> {
        let escapes = plugin_id.is_empty()
            || plugin_id == "."
            || plugin_id == ".."
            || plugin_id.contains(['/', '\\']);
        if escapes {
            return None;
        }
        Some(self.root.join(plugin_id).join(SETTINGS_FILE))
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self, plugin_id: &str, defaults: &SettingsRecord) -> SettingsRecord {
        let Some(path) = self.path_for(plugin_id) else {
            warn!(plugin_id = %plugin_id, "Plugin id is not usable as a settings path, using defaults");
            return defaults.clone();
        };

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(plugin_id = %plugin_id, "No settings file, using defaults");
                return defaults.clone();
            }
            Err(e) => {
                warn!(plugin_id = %plugin_id, path = %path.display(), error = %e, "Failed to read settings, using defaults");
                return defaults.clone();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(persisted)) => merge_over_defaults(defaults, persisted),
            Ok(_) => {
                warn!(plugin_id = %plugin_id, path = %path.display(), "Settings file is not a JSON object, using defaults");
                defaults.clone()
            }
            Err(e) => {
                warn!(plugin_id = %plugin_id, path = %path.display(), error = %e, "Malformed settings file, using defaults");
                defaults.clone()
            }
        }
    }

    async fn save(&self, plugin_id: &str, record: &SettingsRecord) -> Result<(), PluginError> {
        let path = self.path_for(plugin_id).ok_or_else(|| {
            PluginError::Settings(format!("Plugin id {plugin_id} is not usable as a settings path"))
        })?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| PluginError::Settings(format!("Failed to create {}: {e}", dir.display())))?;
        }

        let text = serde_json::to_string_pretty(record)
            .map_err(|e| PluginError::Settings(e.to_string()))?;

        tokio::fs::write(&path, text)
            .await
            .map_err(|e| PluginError::Settings(format!("Failed to write {}: {e}", path.display())))?;

        debug!(plugin_id = %plugin_id, path = %path.display(), "Saved plugin settings");
        Ok(())
    }
}

/// In-process settings storage.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    records: RwLock<HashMap<String, SettingsRecord>>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a persisted record. Non-object values are ignored.
    #[must_use]
    pub fn with_record(self, plugin_id: impl Into<String>, record: Value) -> Self {
        if let Value::Object(record) = record {
            self.records
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(plugin_id.into(), record);
        }
        self
    }

    /// The persisted record for a plugin, if any.
    #[must_use]
    pub fn get(&self, plugin_id: &str) -> Option<SettingsRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(plugin_id)
            .cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, plugin_id: &str, defaults: &SettingsRecord) -> SettingsRecord {
        match self.get(plugin_id) {
            Some(persisted) => merge_over_defaults(defaults, persisted),
            None => defaults.clone(),
        }
    }

    async fn save(&self, plugin_id: &str, record: &SettingsRecord) -> Result<(), PluginError> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(plugin_id.to_string(), record.clone());
        Ok(())
    }
}

/// Live settings of one plugin, backed by a [`SettingsStore`].
pub struct PluginSettings {
    plugin_id: String,
    defaults: SettingsRecord,
    current: RwLock<SettingsRecord>,
    store: Arc<dyn SettingsStore>,
}

impl PluginSettings {
    /// Create a handle holding `defaults` until [`load`](Self::load) runs.
    ///
    /// A non-object `defaults` value is treated as an empty record.
    #[must_use]
    pub fn new(plugin_id: impl Into<String>, defaults: Value, store: Arc<dyn SettingsStore>) -> Self {
        let defaults = match defaults {
            Value::Object(map) => map,
            _ => SettingsRecord::new(),
        };
        Self {
            plugin_id: plugin_id.into(),
            current: RwLock::new(defaults.clone()),
            defaults,
            store,
        }
    }

    #[must_use]
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    #[must_use]
    pub const fn defaults(&self) -> &SettingsRecord {
        &self.defaults
    }

    /// Reload from the store, merged over the defaults.
    pub async fn load(&self) {
        let merged = self.store.load(&self.plugin_id, &self.defaults).await;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = merged;
    }

    /// Copy of the current record.
    #[must_use]
    pub fn snapshot(&self) -> SettingsRecord {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(str::to_string))
    }

    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.as_u64())
    }

    /// Value of the `enabled` key; anything but `true` counts as disabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.get("enabled").and_then(|v| v.as_bool()).unwrap_or(false)
    }

    /// Set a key in memory only.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }

    /// Persist the current record.
    pub async fn save(&self) -> Result<(), PluginError> {
        let snapshot = self.snapshot();
        self.store.save(&self.plugin_id, &snapshot).await
    }

    /// Set a key, then persist the full record.
    pub async fn update(&self, key: impl Into<String>, value: Value) -> Result<(), PluginError> {
        self.set(key, value);
        self.save().await
    }
}

impl std::fmt::Debug for PluginSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginSettings")
            .field("plugin_id", &self.plugin_id)
            .field("current", &self.snapshot())
            .finish_non_exhaustive()
    }
}
