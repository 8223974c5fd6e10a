use std::num::NonZeroUsize;

use crate::cache::{ModeMatching, RetentionPolicy, StatMode};
use crate::error::ConfigError;

use super::types::{CacheConfig, CacheSettings};

impl CacheConfig {
    /// Validates the raw values.
    ///
    /// # Errors
    ///
    /// Returns an error when the mode is not `rolling` or `tiled`, when the
    /// window is missing under rolling, set under tiled, or zero, or when the
    /// statistic or matching rule is unknown.
    pub fn resolve(&self) -> Result<CacheSettings, ConfigError> {
        let mode_matching: ModeMatching = self.mode_matching.parse()?;
        let policy = match self.mode.as_str() {
            "rolling" => {
                let window = self.window.ok_or(ConfigError::WindowRequired)?;
                let window = NonZeroUsize::new(window).ok_or(ConfigError::WindowZero)?;
                RetentionPolicy::rolling(window)
            }
            "tiled" => {
                if let Some(window) = self.window {
                    return Err(ConfigError::WindowForbidden { window });
                }
                RetentionPolicy::Tiled
            }
            other => {
                return Err(ConfigError::UnsupportedMode {
                    value: other.to_owned(),
                });
            }
        };
        let default_stats = StatMode::parse(&self.default_stats, mode_matching)?;
        Ok(CacheSettings {
            policy,
            default_stats,
            mode_matching,
        })
    }
}
