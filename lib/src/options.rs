//! Shared option types that replace boolean flag parameters in the Rust API.

use serde::{Deserialize, Serialize};

/// Controls how graph roles are matched against the head graph.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolePolicy {
    /// First match wins; missing roles are left empty.
    #[default]
    Relaxed,
    /// Every role pattern must match exactly one quad.
    Strict,
}

impl RolePolicy {
    pub fn is_strict(self) -> bool {
        matches!(self, RolePolicy::Strict)
    }
}

impl From<bool> for RolePolicy {
    fn from(value: bool) -> Self {
        if value {
            RolePolicy::Strict
        } else {
            RolePolicy::Relaxed
        }
    }
}

impl From<RolePolicy> for bool {
    fn from(value: RolePolicy) -> Self {
        value.is_strict()
    }
}

/// Order in which quads are serialized before hashing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashOrder {
    /// The order the quads were presented in. Reordering the input changes
    /// the hash.
    #[default]
    Presentation,
    /// Quad serializations sorted bytewise, so the hash ignores input order.
    /// Not compatible with hashes produced in presentation order.
    Canonical,
}

impl HashOrder {
    pub fn is_canonical(self) -> bool {
        matches!(self, HashOrder::Canonical)
    }
}

impl From<bool> for HashOrder {
    fn from(value: bool) -> Self {
        if value {
            HashOrder::Canonical
        } else {
            HashOrder::Presentation
        }
    }
}

/// Whether label lookups may start background remote refinements.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RemoteLabels {
    #[default]
    Enabled,
    Disabled,
}

impl RemoteLabels {
    pub fn is_enabled(self) -> bool {
        matches!(self, RemoteLabels::Enabled)
    }
}

impl From<bool> for RemoteLabels {
    fn from(value: bool) -> Self {
        if value {
            RemoteLabels::Enabled
        } else {
            RemoteLabels::Disabled
        }
    }
}
