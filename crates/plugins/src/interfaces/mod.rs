//! Domain interfaces behind each capability.

mod auth;
mod client;
mod database;
mod theme;

pub use auth::{AuthPlugin, AuthSession, AuthUser};
pub use client::ClientPlugin;
pub use database::{DatabasePlugin, KeyPairRecord, NewPost, PostRecord, ProfileRecord};
pub use theme::{ThemePlugin, ThemeVariable};

use crate::capability::Capability;
use crate::error::PluginError;
use crate::plugin::Plugin;

fn missing(plugin: &dyn Plugin, capability: Capability) -> PluginError {
    PluginError::MissingInterface {
        plugin_id: plugin.id().to_string(),
        capability,
    }
}

/// The plugin's database interface, or `MissingInterface`.
pub fn require_database(plugin: &dyn Plugin) -> Result<&dyn DatabasePlugin, PluginError> {
    plugin
        .as_database()
        .ok_or_else(|| missing(plugin, Capability::Database))
}

/// The plugin's auth interface, or `MissingInterface`.
pub fn require_auth(plugin: &dyn Plugin) -> Result<&dyn AuthPlugin, PluginError> {
    plugin.as_auth().ok_or_else(|| missing(plugin, Capability::Auth))
}

/// The plugin's theme interface, or `MissingInterface`.
pub fn require_theme(plugin: &dyn Plugin) -> Result<&dyn ThemePlugin, PluginError> {
    plugin.as_theme().ok_or_else(|| missing(plugin, Capability::Theme))
}
