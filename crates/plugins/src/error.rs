//! Plugin error types.

use crate::capability::Capability;
use linkgator_common::AppError;
use thiserror::Error;

/// Errors raised by the registry, the settings store and plugin backends.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// The plugin violates the base contract, or lacks what an operation needs.
    #[error("Invalid plugin: {0}")]
    InvalidPlugin(String),

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    /// The plugin declares a capability but does not expose its interface.
    #[error("Plugin {plugin_id} does not implement the {capability} interface")]
    MissingInterface {
        plugin_id: String,
        capability: Capability,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    /// Failure inside a backend (database down, bad credentials store, ...).
    #[error("Backend error: {0}")]
    Backend(String),

    /// The plugin panicked while handling a call.
    #[error("Plugin panicked: {0}")]
    Panicked(String),
}

impl From<AppError> for PluginError {
    fn from(err: AppError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::PluginNotFound(_) => Self::NotFound(err.to_string()),
            PluginError::InvalidPlugin(_) => Self::BadRequest(err.to_string()),
            PluginError::Settings(_) => Self::Config(err.to_string()),
            PluginError::MissingInterface { .. }
            | PluginError::Backend(_)
            | PluginError::Panicked(_) => Self::Plugin(err.to_string()),
        }
    }
}

/// One failed plugin invocation inside a capability fan-out.
#[derive(Debug, Clone, Error)]
#[error("Plugin {plugin_id} failed: {error}")]
pub struct CapabilityExecutionError {
    pub plugin_id: String,
    #[source]
    pub error: PluginError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_app_error() {
        let not_found: AppError = PluginError::PluginNotFound("x".into()).into();
        assert!(matches!(not_found, AppError::NotFound(_)));

        let invalid: AppError = PluginError::InvalidPlugin("x".into()).into();
        assert!(matches!(invalid, AppError::BadRequest(_)));

        let backend: AppError = PluginError::Backend("down".into()).into();
        assert!(backend.is_server_error());
    }
}
