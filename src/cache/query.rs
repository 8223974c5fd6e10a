use std::collections::{BTreeMap, BTreeSet};

use super::sample::Sample;
use super::stats::StatMode;
use super::store::Store;
use super::types::{StatValue, Summary};

/// Per-key statistic overrides.
pub type KeyModes = BTreeMap<String, StatMode>;

/// Key/value pairs for one `store` call.
///
/// Mapping entries and explicit entries are kept apart so precedence does not
/// depend on call order: when both name the same key, the explicit entry is the
/// one stored.
#[derive(Debug, Clone, Default)]
pub struct MetricsBatch {
    mapping: Vec<(String, Sample)>,
    explicit: Vec<(String, Sample)>,
}

impl MetricsBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a batch from a mapping of metric values.
    #[must_use]
    pub fn from_mapping<I, K, V>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Sample>,
    {
        let mut batch = Self::new();
        batch.extend_mapping(mapping);
        batch
    }

    pub fn extend_mapping<I, K, V>(&mut self, mapping: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Sample>,
    {
        self.mapping.extend(
            mapping
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
    }

    /// Adds an explicit entry that wins over a mapping entry for the same key.
    #[must_use]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Sample>,
    {
        self.insert(key, value);
        self
    }

    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Sample>,
    {
        self.explicit.push((key.into(), value.into()));
    }
}

type Entries = std::vec::IntoIter<(String, Sample)>;

impl IntoIterator for MetricsBatch {
    type Item = (String, Sample);
    type IntoIter = std::iter::Chain<Entries, Entries>;

    fn into_iter(self) -> Self::IntoIter {
        self.mapping.into_iter().chain(self.explicit)
    }
}

/// Which keys `get_stats` reduces and with which statistic.
#[derive(Debug, Clone, Default)]
pub struct StatsQuery {
    only_keys: Vec<String>,
    explicit: bool,
    key_modes: KeyModes,
}

impl StatsQuery {
    /// Every stored key with the cache default mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the given keys (plus any key with a mode override).
    #[must_use]
    pub fn only<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            only_keys: keys.into_iter().map(Into::into).collect(),
            explicit: true,
            key_modes: KeyModes::new(),
        }
    }

    #[must_use]
    pub fn key<K>(mut self, key: K) -> Self
    where
        K: Into<String>,
    {
        self.only_keys.push(key.into());
        self
    }

    /// Restricts the result to named keys and override keys even when no key
    /// was named.
    #[must_use]
    pub const fn explicit(mut self, explicit: bool) -> Self {
        self.explicit = explicit;
        self
    }

    #[must_use]
    pub fn mode<K>(mut self, key: K, mode: StatMode) -> Self
    where
        K: Into<String>,
    {
        self.key_modes.insert(key.into(), mode);
        self
    }

    #[must_use]
    pub fn key_modes(mut self, key_modes: KeyModes) -> Self {
        self.key_modes.extend(key_modes);
        self
    }

    pub(crate) fn from_modes(key_modes: &KeyModes) -> Self {
        Self {
            only_keys: Vec::new(),
            explicit: false,
            key_modes: key_modes.clone(),
        }
    }

    pub(crate) fn is_explicit(&self) -> bool {
        self.explicit || !self.only_keys.is_empty()
    }

    /// Keys to reduce, before skipping the ones absent from the store.
    pub(crate) fn working_keys<'query>(
        &'query self,
        store: &'query Store,
    ) -> BTreeSet<&'query str> {
        if self.is_explicit() {
            self.only_keys
                .iter()
                .map(String::as_str)
                .chain(self.key_modes.keys().map(String::as_str))
                .collect()
        } else {
            store.keys().collect()
        }
    }

    pub(crate) fn mode_for(&self, key: &str, default: StatMode) -> StatMode {
        self.key_modes.get(key).copied().unwrap_or(default)
    }
}

/// Options for one `summarize` call.
#[derive(Debug, Clone, Default)]
pub struct SummarizeOptions {
    force_clear: bool,
    key_modes: KeyModes,
    extras: Summary,
}

impl SummarizeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the store after this summary even under a rolling policy.
    #[must_use]
    pub const fn force_clear(mut self, force_clear: bool) -> Self {
        self.force_clear = force_clear;
        self
    }

    #[must_use]
    pub fn mode<K>(mut self, key: K, mode: StatMode) -> Self
    where
        K: Into<String>,
    {
        self.key_modes.insert(key.into(), mode);
        self
    }

    #[must_use]
    pub fn key_modes(mut self, key_modes: KeyModes) -> Self {
        self.key_modes.extend(key_modes);
        self
    }

    /// Reports `value` under `key` alongside the reduced statistics.
    #[must_use]
    pub fn extra<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<StatValue>,
    {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub(crate) const fn forces_clear(&self) -> bool {
        self.force_clear
    }

    pub(crate) const fn modes(&self) -> &KeyModes {
        &self.key_modes
    }

    pub(crate) const fn extras(&self) -> &Summary {
        &self.extras
    }
}
