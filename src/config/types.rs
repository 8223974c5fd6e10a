use serde::{Deserialize, Serialize};

use crate::cache::{ModeMatching, RetentionPolicy, StatMode};

/// Raw cache configuration as written in a config file.
///
/// Values stay strings until [`CacheConfig::resolve`] validates them, so an
/// unsupported mode surfaces as a configuration error rather than a parse
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `rolling` or `tiled`.
    pub mode: String,
    /// Statistic used for keys without an override.
    #[serde(alias = "default_mode")]
    pub default_stats: String,
    /// Samples kept per key; required for rolling, forbidden for tiled.
    pub window: Option<usize>,
    /// `exact` or `prefix`.
    pub mode_matching: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: RetentionPolicy::Tiled.as_str().to_owned(),
            default_stats: StatMode::default().as_str().to_owned(),
            window: None,
            mode_matching: ModeMatching::default().as_str().to_owned(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn tiled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rolling(window: usize) -> Self {
        Self {
            mode: "rolling".to_owned(),
            window: Some(window),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_default_stats(mut self, mode: StatMode) -> Self {
        mode.as_str().clone_into(&mut self.default_stats);
        self
    }

    #[must_use]
    pub fn with_mode_matching(mut self, matching: ModeMatching) -> Self {
        matching.as_str().clone_into(&mut self.mode_matching);
        self
    }
}

/// Validated construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub policy: RetentionPolicy,
    pub default_stats: StatMode,
    pub mode_matching: ModeMatching,
}
