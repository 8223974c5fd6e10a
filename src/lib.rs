//! In-memory aggregation buffer for streaming metrics.
//!
//! A [`cache::SummaryCache`] keeps raw samples per metric key under a rolling
//! (bounded window) or tiled (drained on summary) retention policy and
//! reduces them on demand into named statistics: mean, min/max, standard
//! deviation with mode, quantiles, or a histogram. The `summary-cache` binary
//! replays JSON-lines records through a cache and prints the summaries.
pub mod args;
pub mod cache;
pub mod config;
pub mod error;
pub mod replay;

pub use cache::{
    MetricsBatch, RetentionPolicy, Sample, StatMode, StatValue, StatsQuery, SummarizeOptions,
    Summary, SummaryCache,
};
pub use config::CacheConfig;
