//! The summary cache: per-key sample buffers and their reductions.
mod query;
mod sample;
mod stats;
mod store;
mod types;


use std::collections::BTreeMap;

use crate::config::{CacheConfig, CacheSettings};
use crate::error::{CacheError, ConfigError};

pub use query::{KeyModes, MetricsBatch, StatsQuery, SummarizeOptions};
pub use sample::Sample;
pub use stats::{HISTOGRAM_BINS, ModeMatching, StatMode};
pub use store::RetentionPolicy;
pub use types::{StatValue, Summary};

use store::Store;

/// Number of samples per key returned by `peek` when callers have no preference.
pub const DEFAULT_PEEK_LIMIT: usize = 5;

/// Buffers metric samples per key and reduces them into summaries on demand.
///
/// Producers call [`SummaryCache::store`]; consumers call
/// [`SummaryCache::get_stats`], which never mutates, or
/// [`SummaryCache::summarize`], which empties the store afterwards under a
/// tiled policy or when asked to.
///
/// The cache has a single owner. Callers that share it across threads must
/// guard it with their own lock, since summarizing reads then clears.
/// Under a tiled policy memory grows until the next summary.
#[derive(Debug)]
pub struct SummaryCache {
    policy: RetentionPolicy,
    default_stats: StatMode,
    mode_matching: ModeMatching,
    store: Store,
}

impl SummaryCache {
    /// Builds a cache from raw configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error when the mode is unknown, when the window is missing
    /// under rolling mode, set under tiled mode, or zero, or when the default
    /// statistic is unknown.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let settings = config.resolve()?;
        Ok(Self::from_settings(settings))
    }

    #[must_use]
    pub fn from_settings(settings: CacheSettings) -> Self {
        let mut cache = Self::with_policy(settings.policy, settings.default_stats);
        cache.mode_matching = settings.mode_matching;
        cache
    }

    #[must_use]
    pub fn with_policy(policy: RetentionPolicy, default_stats: StatMode) -> Self {
        tracing::debug!(
            policy = policy.as_str(),
            window = policy.window().map(std::num::NonZeroUsize::get),
            default_stats = default_stats.as_str(),
            "Created summary cache"
        );
        Self {
            policy,
            default_stats,
            mode_matching: ModeMatching::Exact,
            store: Store::default(),
        }
    }

    /// Appends one sample per key.
    ///
    /// Entries are merged first with the later entry for a key winning, so a
    /// key named twice still receives a single sample. Passing a
    /// [`MetricsBatch`] puts its explicit entries after its mapping entries.
    /// Any string is a valid key, the empty one included. Returns every key
    /// named, in order, duplicates included.
    pub fn store<I, K, V>(&mut self, metrics: I) -> Vec<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Sample>,
    {
        let mut touched = Vec::new();
        let mut merged: Vec<(String, Sample)> = Vec::new();
        for (key, value) in metrics {
            let key = key.into();
            let value = value.into();
            touched.push(key.clone());
            match merged.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => merged.push((key, value)),
            }
        }

        let policy = self.policy;
        let mut evicted = 0_usize;
        for (key, value) in merged {
            let dropped = self.store.buffer_or_insert(key).push(value, policy);
            evicted = evicted.saturating_add(dropped);
        }
        tracing::trace!(keys = touched.len(), evicted, "Stored metrics");
        touched
    }

    /// Reduces the selected keys without touching the store.
    ///
    /// Keys that hold no samples are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Reduction` for the first key whose samples are
    /// not numeric or differ in shape.
    pub fn get_stats(&self, query: &StatsQuery) -> Result<Summary, CacheError> {
        let mut summary = Summary::new();
        for key in query.working_keys(&self.store) {
            let Some(buffer) = self.store.samples(key) else {
                continue;
            };
            let mode = query.mode_for(key, self.default_stats);
            let reduced = sample::stack(buffer.iter())
                .and_then(|samples| stats::reduce(mode, &samples))
                .map_err(|source| CacheError::Reduction {
                    key: key.to_owned(),
                    mode: mode.as_str(),
                    source,
                })?;
            for (suffix, value) in reduced {
                summary.insert(format!("{}/{}", key, suffix), value);
            }
        }
        Ok(summary)
    }

    /// Reduces every key, then clears the store when the policy is tiled or
    /// `force_clear` is set. Extras are added to the result last.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Reduction` as [`SummaryCache::get_stats`] does; the
    /// store is left as it was.
    pub fn summarize(&mut self, options: &SummarizeOptions) -> Result<Summary, CacheError> {
        let mut summary = self.get_stats(&StatsQuery::from_modes(options.modes()))?;
        let clear = options.forces_clear() || self.policy.drains_on_summarize();
        if clear {
            self.clear();
        }
        tracing::debug!(
            entries = summary.len(),
            cleared = clear,
            "Summarized metrics"
        );
        summary.extend(
            options
                .extras()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Ok(summary)
    }

    pub fn clear(&mut self) {
        tracing::trace!(keys = self.store.len(), "Clearing summary cache");
        self.store.clear();
    }

    /// Up to `limit` of the oldest samples for each key in `keys`, or for
    /// every key when `keys` is empty. Keys without samples are omitted.
    #[must_use]
    pub fn peek<K>(&self, keys: &[K], limit: usize) -> BTreeMap<String, Vec<Sample>>
    where
        K: AsRef<str>,
    {
        let selected: Vec<&str> = if keys.is_empty() {
            self.store.keys().collect()
        } else {
            keys.iter().map(|key| key.as_ref()).collect()
        };
        selected
            .into_iter()
            .filter_map(|key| {
                self.store
                    .samples(key)
                    .map(|buffer| (key.to_owned(), buffer.oldest(limit)))
            })
            .collect()
    }

    /// True when at least one key holds a sample.
    #[must_use]
    pub fn is_non_empty(&self) -> bool {
        self.store.is_non_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.is_non_empty()
    }

    /// Number of keys stored since the last clear.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.keys()
    }

    #[must_use]
    pub fn sample_count(&self, key: &str) -> usize {
        self.store.samples(key).map_or(0, store::SampleBuffer::len)
    }

    #[must_use]
    pub const fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    #[must_use]
    pub const fn default_stats(&self) -> StatMode {
        self.default_stats
    }

    /// Parses a mode name with this cache's matching rule.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownStatMode` when no mode matches.
    pub fn parse_mode(&self, value: &str) -> Result<StatMode, ConfigError> {
        StatMode::parse(value, self.mode_matching)
    }
}
