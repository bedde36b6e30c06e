//! Plugin registry.
//!
//! Owns every live plugin for the life of the process. Lookups return
//! plugins in registration order.

use serde_json::Value;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::capability::Capability;
use crate::catalog::{PluginCatalog, PluginContext};
use crate::error::PluginError;
use crate::plugin::{Plugin, validate};

/// Lifecycle of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Uninitialized,
    Initializing,
    Ready,
}

impl RegistryState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Initializing,
            _ => Self::Ready,
        }
    }

    const fn as_u8(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Initializing => 1,
            Self::Ready => 2,
        }
    }
}

/// Registry of plugin instances.
pub struct PluginRegistry {
    plugins: RwLock<Vec<Arc<dyn Plugin>>>,
    state: AtomicU8,
    init: OnceCell<usize>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
            state: AtomicU8::new(RegistryState::Uninitialized.as_u8()),
            init: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> RegistryState {
        RegistryState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: RegistryState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Run discovery once. Concurrent callers wait for the same pass.
    ///
    /// Returns the number of plugins registered by that pass.
    pub async fn initialize(&self, catalog: &PluginCatalog, ctx: &PluginContext) -> usize {
        *self
            .init
            .get_or_init(|| async {
                self.set_state(RegistryState::Initializing);
                let registered = self.discover(catalog, ctx).await;
                self.set_state(RegistryState::Ready);
                info!(registered, total = self.len(), "Plugin registry ready");
                registered
            })
            .await
    }

    /// Build and register every plugin in the catalog.
    ///
    /// Factories that fail, decline, or produce an invalid plugin are
    /// skipped; discovery never aborts.
    pub async fn discover(&self, catalog: &PluginCatalog, ctx: &PluginContext) -> usize {
        let mut registered = 0;

        for factory in catalog.factories() {
            let plugin = match factory.build(ctx) {
                Ok(Some(plugin)) => plugin,
                Ok(None) => {
                    debug!(factory = factory.name(), "Plugin factory declined to build");
                    continue;
                }
                Err(e) => {
                    warn!(factory = factory.name(), error = %e, "Plugin factory failed, skipping");
                    continue;
                }
            };

            match self.register(plugin).await {
                Ok(true) => registered += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(factory = factory.name(), error = %e, "Discovered plugin rejected, skipping");
                }
            }
        }

        registered
    }

    /// Register a plugin and load its settings.
    ///
    /// Returns `Ok(false)` if a plugin with the same id is already
    /// registered; the existing instance is kept.
    pub async fn register(&self, plugin: Arc<dyn Plugin>) -> Result<bool, PluginError> {
        validate(plugin.as_ref())?;

        let id = plugin.id().to_string();
        if self.has(&id) {
            warn!(plugin_id = %id, "Plugin already registered, ignoring");
            return Ok(false);
        }

        plugin.load_settings().await?;

        {
            let mut plugins = self.plugins.write().unwrap_or_else(PoisonError::into_inner);
            // Another register for the same id may have finished while settings loaded
            if plugins.iter().any(|p| p.id() == id) {
                warn!(plugin_id = %id, "Plugin already registered, ignoring");
                return Ok(false);
            }
            plugins.push(plugin);
        }

        info!(plugin_id = %id, "Registered plugin");
        Ok(true)
    }

    /// Remove a plugin. Returns whether it was registered.
    pub fn unregister(&self, id: &str) -> bool {
        let mut plugins = self.plugins.write().unwrap_or_else(PoisonError::into_inner);
        let before = plugins.len();
        plugins.retain(|p| p.id() != id);
        let removed = plugins.len() != before;
        if removed {
            info!(plugin_id = %id, "Unregistered plugin");
        }
        removed
    }

    pub fn get_by_id(&self, id: &str) -> Result<Arc<dyn Plugin>, PluginError> {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or_else(|| PluginError::PluginNotFound(id.to_string()))
    }

    /// Every plugin declaring `capability`, enabled or not.
    #[must_use]
    pub fn get_by_capability(&self, capability: Capability) -> Vec<Arc<dyn Plugin>> {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|p| p.capabilities().contains(capability))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|p| p.id() == id)
    }

    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Change one setting of a live plugin and persist the full record.
    pub async fn update_setting(
        &self,
        plugin_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), PluginError> {
        let plugin = self.get_by_id(plugin_id)?;
        let settings = plugin.settings().ok_or_else(|| {
            PluginError::InvalidPlugin(format!("plugin {plugin_id} has no settings"))
        })?;

        settings.update(key, value).await?;
        info!(plugin_id = %plugin_id, key = %key, "Updated plugin setting");
        Ok(())
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self.all().iter().map(|p| p.id().to_string()).collect();
        f.debug_struct("PluginRegistry")
            .field("state", &self.state())
            .field("plugins", &ids)
            .finish()
    }
}
