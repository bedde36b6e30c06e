//! Theme capability.

use serde::Serialize;

/// One CSS custom property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeVariable {
    pub name: String,
    pub value: String,
}

pub trait ThemePlugin: Send + Sync {
    /// CSS custom properties, in declaration order.
    fn theme_variables(&self) -> Vec<ThemeVariable>;
}
