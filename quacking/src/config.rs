//! Mixin Configuration
//!
//! Policy knobs for the registry. All fields have defaults, so a partial
//! TOML document is enough.

use serde::{Deserialize, Serialize};

use crate::error::QuackResult;

/// Configuration for a [`Mixin`](crate::Mixin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixinConfig {
    /// What to do when the resolved method cannot be accessed.
    pub inaccessible: InaccessiblePolicy,

    /// List the preferred object first and again at its insertion position.
    pub duplicate_preferred: bool,

    /// Cache resolved invocations per call shape.
    pub cache_invocations: bool,
}

impl Default for MixinConfig {
    fn default() -> Self {
        Self {
            inaccessible: InaccessiblePolicy::Fail,
            duplicate_preferred: true,
            cache_invocations: true,
        }
    }
}

impl MixinConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(source: &str) -> QuackResult<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Inaccessible member policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InaccessiblePolicy {
    /// Abort the call with an inaccessible member error.
    #[default]
    Fail,
    /// Log and try the next candidate.
    Skip,
}
