//! Capability tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A kind of service a plugin can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Database,
    Auth,
    Storage,
    Theme,
    Client,
}

impl Capability {
    /// All capabilities, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Database,
        Self::Auth,
        Self::Storage,
        Self::Theme,
        Self::Client,
    ];

    /// Lowercase tag as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Auth => "auth",
            Self::Storage => "storage",
            Self::Theme => "theme",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of capabilities declared by one plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilitySet(Vec<Capability>);

impl CapabilitySet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a capability; duplicates are ignored.
    pub fn insert(&mut self, capability: Capability) -> bool {
        if self.0.contains(&capability) {
            return false;
        }
        self.0.push(capability);
        true
    }

    #[must_use]
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        Self(vec![capability])
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::new();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}
