//! Stub plugins shared by the integration tests.

#![allow(dead_code)]

use linkgator_plugins::{
    Capability, CapabilitySet, ClientPlugin, MemorySettingsStore, Plugin, PluginManifest,
    PluginSettings, PostRecord, SettingsStore,
};
use serde_json::json;
use std::sync::Arc;

/// Plugin with a configurable manifest and optional settings.
pub struct StubPlugin {
    manifest: PluginManifest,
    settings: Option<PluginSettings>,
}

impl StubPlugin {
    /// Storage plugin without settings (always enabled).
    pub fn storage(id: &str) -> Self {
        Self {
            manifest: PluginManifest::new(id, format!("Stub {id}"), "0.1.0", Capability::Storage),
            settings: None,
        }
    }

    /// Storage plugin whose `enabled` default is `enabled`.
    pub fn storage_with_settings(id: &str, enabled: bool, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            manifest: PluginManifest::new(id, format!("Stub {id}"), "0.1.0", Capability::Storage),
            settings: Some(PluginSettings::new(id, json!({ "enabled": enabled }), store)),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.manifest.name = name.to_string();
        self
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.manifest.capabilities = capabilities;
        self
    }

    pub fn into_arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

impl Plugin for StubPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn settings(&self) -> Option<&PluginSettings> {
        self.settings.as_ref()
    }
}

/// Client plugin contributing a fixed sidebar.
pub struct SidebarPlugin {
    manifest: PluginManifest,
}

impl SidebarPlugin {
    pub fn new() -> Self {
        Self {
            manifest: PluginManifest::new("sidebar", "Sidebar", "1.0.0", Capability::Client),
        }
    }
}

impl Plugin for SidebarPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn as_client(&self) -> Option<&dyn ClientPlugin> {
        Some(self)
    }
}

impl ClientPlugin for SidebarPlugin {
    fn main_feed(&self, posts: &[PostRecord]) -> Option<String> {
        (!posts.is_empty()).then(|| format!("{} posts", posts.len()))
    }

    fn home_sidebar(&self) -> Option<String> {
        Some("Welcome".to_string())
    }
}

pub fn memory_store() -> Arc<dyn SettingsStore> {
    Arc::new(MemorySettingsStore::new())
}
