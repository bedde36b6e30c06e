//! Built-in CSS themes.

use serde_json::json;
use std::sync::Arc;

use crate::capability::Capability;
use crate::interfaces::{ThemePlugin, ThemeVariable};
use crate::plugin::{Plugin, PluginManifest};
use crate::settings::{PluginSettings, SettingsStore};

type Palette = &'static [(&'static str, &'static str)];

const LIGHT: Palette = &[
    ("--color-primary", "oklch(0.4 0.15 240)"),
    ("--color-primary-light", "oklch(0.5 0.12 240)"),
    ("--color-primary-dark", "oklch(0.3 0.18 240)"),
    ("--color-on-primary", "oklch(0.98 0.02 240)"),
    ("--color-secondary", "oklch(0.45 0.1 280)"),
    ("--color-on-secondary", "oklch(0.98 0.02 280)"),
    ("--color-surface", "oklch(0.98 0.005 240)"),
    ("--color-surface-variant", "oklch(0.94 0.01 240)"),
    ("--color-on-surface", "oklch(0.12 0.02 240)"),
    ("--color-on-surface-variant", "oklch(0.25 0.02 240)"),
    ("--color-background", "oklch(0.99 0.002 240)"),
    ("--color-on-background", "oklch(0.1 0.02 240)"),
    ("--color-outline", "oklch(0.5 0.02 240)"),
    ("--color-error", "oklch(0.5 0.15 25)"),
    ("--color-success", "oklch(0.4 0.15 140)"),
    ("--color-warning", "oklch(0.45 0.15 60)"),
];

const DARK: Palette = &[
    ("--color-primary", "oklch(0.7 0.15 240)"),
    ("--color-primary-light", "oklch(0.8 0.12 240)"),
    ("--color-primary-dark", "oklch(0.6 0.18 240)"),
    ("--color-on-primary", "oklch(0.98 0.02 240)"),
    ("--color-secondary", "oklch(0.65 0.1 280)"),
    ("--color-on-secondary", "oklch(0.98 0.02 280)"),
    ("--color-surface", "oklch(0.12 0.02 240)"),
    ("--color-surface-variant", "oklch(0.16 0.02 240)"),
    ("--color-on-surface", "oklch(0.92 0.02 240)"),
    ("--color-on-surface-variant", "oklch(0.8 0.02 240)"),
    ("--color-background", "oklch(0.08 0.02 240)"),
    ("--color-on-background", "oklch(0.95 0.02 240)"),
    ("--color-outline", "oklch(0.5 0.02 240)"),
    ("--color-error", "oklch(0.7 0.15 25)"),
    ("--color-success", "oklch(0.6 0.15 140)"),
    ("--color-warning", "oklch(0.65 0.15 60)"),
];

/// A fixed palette of CSS custom properties.
pub struct CssThemePlugin {
    manifest: PluginManifest,
    settings: PluginSettings,
    palette: Palette,
}

impl CssThemePlugin {
    pub const LIGHT_ID: &'static str = "light-theme";
    pub const DARK_ID: &'static str = "dark-theme";

    /// Light palette, enabled by default.
    #[must_use]
    pub fn light(store: Arc<dyn SettingsStore>) -> Self {
        Self::new(
            PluginManifest::new(Self::LIGHT_ID, "Light Theme", "1.0.0", Capability::Theme)
                .with_description("Light theme following Material 3 color roles"),
            true,
            LIGHT,
            store,
        )
    }

    /// Dark palette, disabled by default.
    #[must_use]
    pub fn dark(store: Arc<dyn SettingsStore>) -> Self {
        Self::new(
            PluginManifest::new(Self::DARK_ID, "Dark Theme", "1.0.0", Capability::Theme)
                .with_description("Dark theme following Material 3 color roles"),
            false,
            DARK,
            store,
        )
    }

    fn new(
        manifest: PluginManifest,
        enabled: bool,
        palette: Palette,
        store: Arc<dyn SettingsStore>,
    ) -> Self {
        let settings = PluginSettings::new(manifest.id.clone(), json!({ "enabled": enabled }), store);
        Self {
            manifest,
            settings,
            palette,
        }
    }
}

impl Plugin for CssThemePlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn settings(&self) -> Option<&PluginSettings> {
        Some(&self.settings)
    }

    fn as_theme(&self) -> Option<&dyn ThemePlugin> {
        Some(self)
    }
}

impl ThemePlugin for CssThemePlugin {
    fn theme_variables(&self) -> Vec<ThemeVariable> {
        self.palette
            .iter()
            .map(|(name, value)| ThemeVariable {
                name: (*name).to_string(),
                value: (*value).to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;

    #[test]
    fn test_default_enablement() {
        let store: Arc<dyn SettingsStore> = Arc::new(MemorySettingsStore::new());
        assert!(CssThemePlugin::light(Arc::clone(&store)).is_enabled());
        assert!(!CssThemePlugin::dark(store).is_enabled());
    }

    #[test]
    fn test_palettes_define_the_same_variables() {
        let store: Arc<dyn SettingsStore> = Arc::new(MemorySettingsStore::new());
        let light: Vec<String> = CssThemePlugin::light(Arc::clone(&store))
            .theme_variables()
            .into_iter()
            .map(|v| v.name)
            .collect();
        let dark: Vec<String> = CssThemePlugin::dark(store)
            .theme_variables()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(light, dark);
        assert!(light.iter().all(|name| name.starts_with("--")));
    }
}
