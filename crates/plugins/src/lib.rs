//! Capability-typed plugin system for LinkGator.
//!
//! Backends (databases, authentication, themes, client fragments) are
//! plugins registered in a [`PluginRegistry`]. Callers never talk to a
//! backend directly: they fan out over every enabled plugin of a
//! [`Capability`] through the [`PluginExecutor`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use linkgator_plugins::{
//!     Capability, MemorySettingsStore, PluginContext, PluginExecutor, PluginRegistry,
//!     builtin_catalog, require_theme,
//! };
//!
//! # async fn run() {
//! let registry = Arc::new(PluginRegistry::new());
//! let ctx = PluginContext::new(Arc::new(MemorySettingsStore::new()));
//! registry.initialize(&builtin_catalog(), &ctx).await;
//!
//! let executor = PluginExecutor::new(Arc::clone(&registry));
//! let outcome = executor
//!     .execute_for_capability(Capability::Theme, |plugin| async move {
//!         Ok(Some(require_theme(plugin.as_ref())?.theme_variables().len()))
//!     })
//!     .await;
//! # let _ = outcome;
//! # }
//! ```

pub mod builtin;
pub mod capability;
pub mod catalog;
pub mod error;
pub mod executor;
pub mod interfaces;
pub mod plugin;
pub mod registry;
pub mod settings;

pub use builtin::{CssThemePlugin, LocalAuthPlugin, MemoryDatabasePlugin, SqlDatabasePlugin};
pub use capability::{Capability, CapabilitySet};
pub use catalog::{PluginCatalog, PluginContext, PluginFactory, builtin_catalog};
pub use error::{CapabilityExecutionError, PluginError};
pub use executor::{ExecutionOutcome, PluginExecutor};
pub use interfaces::{
    AuthPlugin, AuthSession, AuthUser, ClientPlugin, DatabasePlugin, KeyPairRecord, NewPost,
    PostRecord, ProfileRecord, ThemePlugin, ThemeVariable, require_auth, require_database,
    require_theme,
};
pub use plugin::{Plugin, PluginManifest};
pub use registry::{PluginRegistry, RegistryState};
pub use settings::{
    FileSettingsStore, MemorySettingsStore, PluginSettings, SettingsRecord, SettingsStore,
};
