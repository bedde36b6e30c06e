//! The plugin abstraction.

use async_trait::async_trait;
use serde::Serialize;

use crate::capability::{Capability, CapabilitySet};
use crate::error::PluginError;
use crate::interfaces::{AuthPlugin, ClientPlugin, DatabasePlugin, ThemePlugin};
use crate::settings::PluginSettings;

/// Static description of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginManifest {
    /// Stable unique identifier, also the settings directory name.
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub capabilities: CapabilitySet,
}

impl PluginManifest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        capabilities: impl Into<CapabilitySet>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: String::new(),
            capabilities: capabilities.into(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A registered backend.
///
/// Domain interfaces are reached through the typed `as_*` accessors; a
/// plugin returns `Some` for every capability it declares.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    fn manifest(&self) -> &PluginManifest;

    fn id(&self) -> &str {
        &self.manifest().id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.manifest().capabilities
    }

    /// Settings handle, if the plugin is configurable.
    fn settings(&self) -> Option<&PluginSettings> {
        None
    }

    /// Load persisted settings over the defaults.
    async fn load_settings(&self) -> Result<(), PluginError> {
        if let Some(settings) = self.settings() {
            settings.load().await;
        }
        Ok(())
    }

    /// A plugin without settings is always enabled.
    fn is_enabled(&self) -> bool {
        self.settings().is_none_or(PluginSettings::enabled)
    }

    fn as_database(&self) -> Option<&dyn DatabasePlugin> {
        None
    }

    fn as_auth(&self) -> Option<&dyn AuthPlugin> {
        None
    }

    fn as_theme(&self) -> Option<&dyn ThemePlugin> {
        None
    }

    fn as_client(&self) -> Option<&dyn ClientPlugin> {
        None
    }
}

/// Check the base contract every registered plugin must satisfy.
pub fn validate(plugin: &dyn Plugin) -> Result<(), PluginError> {
    let manifest = plugin.manifest();

    if manifest.id.trim().is_empty() {
        return Err(PluginError::InvalidPlugin("plugin id is empty".to_string()));
    }
    if manifest.name.trim().is_empty() {
        return Err(PluginError::InvalidPlugin(format!(
            "plugin {} has no name",
            manifest.id
        )));
    }
    if manifest.version.trim().is_empty() {
        return Err(PluginError::InvalidPlugin(format!(
            "plugin {} has no version",
            manifest.id
        )));
    }
    if manifest.capabilities.is_empty() {
        return Err(PluginError::InvalidPlugin(format!(
            "plugin {} declares no capabilities",
            manifest.id
        )));
    }

    for capability in manifest.capabilities.iter() {
        let backed = match capability {
            Capability::Database => plugin.as_database().is_some(),
            Capability::Auth => plugin.as_auth().is_some(),
            Capability::Theme => plugin.as_theme().is_some(),
            Capability::Client => plugin.as_client().is_some(),
            Capability::Storage => true,
        };
        if !backed {
            return Err(PluginError::InvalidPlugin(format!(
                "plugin {} declares {capability} but does not implement it",
                manifest.id
            )));
        }
    }

    Ok(())
}
