//! Compile-time plugin catalog.
//!
//! Plugins are not loaded from disk: each one is a factory linked into the
//! binary. Factories receive the shared [`PluginContext`] and may decline to
//! build (e.g. the SQL backend without a database connection).

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::builtin::{CssThemePlugin, LocalAuthPlugin, MemoryDatabasePlugin, SqlDatabasePlugin};
use crate::error::PluginError;
use crate::plugin::Plugin;
use crate::settings::SettingsStore;

/// Shared resources handed to plugin factories.
#[derive(Clone)]
pub struct PluginContext {
    pub settings: Arc<dyn SettingsStore>,
    pub database: Option<Arc<DatabaseConnection>>,
}

impl PluginContext {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            database: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: Arc<DatabaseConnection>) -> Self {
        self.database = Some(database);
        self
    }
}

type BuildFn =
    dyn Fn(&PluginContext) -> Result<Option<Arc<dyn Plugin>>, PluginError> + Send + Sync;

/// Builds one plugin.
pub struct PluginFactory {
    name: &'static str,
    build: Box<BuildFn>,
}

impl PluginFactory {
    pub fn new<F>(name: &'static str, build: F) -> Self
    where
        F: Fn(&PluginContext) -> Result<Option<Arc<dyn Plugin>>, PluginError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            build: Box::new(build),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// `Ok(None)` when the plugin does not apply to this context.
    pub fn build(&self, ctx: &PluginContext) -> Result<Option<Arc<dyn Plugin>>, PluginError> {
        (self.build)(ctx)
    }
}

/// Ordered list of plugin factories.
#[derive(Default)]
pub struct PluginCatalog {
    factories: Vec<PluginFactory>,
}

impl PluginCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, factory: PluginFactory) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn push(&mut self, factory: PluginFactory) {
        self.factories.push(factory);
    }

    #[must_use]
    pub fn factories(&self) -> &[PluginFactory] {
        &self.factories
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Catalog of the plugins shipped with LinkGator.
#[must_use]
pub fn builtin_catalog() -> PluginCatalog {
    PluginCatalog::new()
        .with(PluginFactory::new(SqlDatabasePlugin::ID, |ctx| {
            Ok(ctx.database.as_ref().map(|db| {
                Arc::new(SqlDatabasePlugin::new(Arc::clone(db), Arc::clone(&ctx.settings)))
                    as Arc<dyn Plugin>
            }))
        }))
        .with(PluginFactory::new(MemoryDatabasePlugin::ID, |ctx| {
            Ok(Some(Arc::new(MemoryDatabasePlugin::new(Arc::clone(&ctx.settings)))))
        }))
        .with(PluginFactory::new(LocalAuthPlugin::ID, |ctx| {
            Ok(Some(Arc::new(LocalAuthPlugin::new(Arc::clone(&ctx.settings)))))
        }))
        .with(PluginFactory::new(CssThemePlugin::LIGHT_ID, |ctx| {
            Ok(Some(Arc::new(CssThemePlugin::light(Arc::clone(&ctx.settings)))))
        }))
        .with(PluginFactory::new(CssThemePlugin::DARK_ID, |ctx| {
            Ok(Some(Arc::new(CssThemePlugin::dark(Arc::clone(&ctx.settings)))))
        }))
}
