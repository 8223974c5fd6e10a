use std::collections::{BTreeMap, VecDeque};
use std::num::NonZeroUsize;

use super::sample::Sample;

/// How a key's sample sequence grows and when it is emptied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep the newest `window` samples per key; never cleared on read.
    Rolling { window: NonZeroUsize },
    /// Keep every sample until the next summary drains the store.
    Tiled,
}

impl RetentionPolicy {
    #[must_use]
    pub const fn rolling(window: NonZeroUsize) -> Self {
        RetentionPolicy::Rolling { window }
    }

    #[must_use]
    pub const fn window(self) -> Option<NonZeroUsize> {
        match self {
            RetentionPolicy::Rolling { window } => Some(window),
            RetentionPolicy::Tiled => None,
        }
    }

    /// Whether a summary empties the store under this policy.
    #[must_use]
    pub const fn drains_on_summarize(self) -> bool {
        matches!(self, RetentionPolicy::Tiled)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RetentionPolicy::Rolling { .. } => "rolling",
            RetentionPolicy::Tiled => "tiled",
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SampleBuffer {
    samples: VecDeque<Sample>,
}

impl SampleBuffer {
    /// Appends `sample`, then trims the oldest entries past the rolling window.
    /// Returns how many samples were evicted.
    pub(crate) fn push(&mut self, sample: Sample, policy: RetentionPolicy) -> usize {
        self.samples.push_back(sample);
        let Some(window) = policy.window() else {
            return 0;
        };
        let mut evicted = 0_usize;
        while self.samples.len() > window.get() {
            self.samples.pop_front();
            evicted = evicted.saturating_add(1);
        }
        evicted
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Up to `limit` of the oldest samples.
    pub(crate) fn oldest(&self, limit: usize) -> Vec<Sample> {
        self.samples.iter().take(limit).cloned().collect()
    }
}

/// Per-key sample sequences, ordered by key.
#[derive(Debug, Default)]
pub(crate) struct Store {
    buffers: BTreeMap<String, SampleBuffer>,
}

impl Store {
    /// Returns the buffer for `key`, creating an empty one on first use.
    pub(crate) fn buffer_or_insert(&mut self, key: String) -> &mut SampleBuffer {
        self.buffers.entry(key).or_default()
    }

    /// The buffer for `key` when it holds at least one sample.
    pub(crate) fn samples(&self, key: &str) -> Option<&SampleBuffer> {
        self.buffers.get(key).filter(|buffer| !buffer.is_empty())
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.buffers.len()
    }

    pub(crate) fn is_non_empty(&self) -> bool {
        self.buffers.values().any(|buffer| !buffer.is_empty())
    }

    pub(crate) fn clear(&mut self) {
        self.buffers.clear();
    }
}
