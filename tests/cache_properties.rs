use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use summary_cache::cache::DEFAULT_PEEK_LIMIT;
use summary_cache::{
    CacheConfig, MetricsBatch, RetentionPolicy, Sample, StatMode, StatValue, StatsQuery,
    SummarizeOptions, SummaryCache,
};

fn rolling(window: usize) -> Result<SummaryCache, String> {
    let window = NonZeroUsize::new(window).ok_or_else(|| "window must be non-zero".to_owned())?;
    Ok(SummaryCache::with_policy(
        RetentionPolicy::rolling(window),
        StatMode::Mean,
    ))
}

#[test]
fn rolling_window_never_exceeds_capacity() -> Result<(), String> {
    for window in 1..=4 {
        let mut cache = rolling(window)?;
        for value in 0..10 {
            cache.store([("k", value)]);
            if cache.sample_count("k") > window {
                return Err(format!("window {} exceeded", window));
            }
        }
        let kept = cache.peek(&["k"], usize::MAX);
        let expected: Vec<Sample> = (10 - window..10)
            .map(|value| Sample::Scalar(value as f64))
            .collect();
        if kept.get("k") != Some(&expected) {
            return Err(format!("window {} kept {:?}", window, kept));
        }
    }
    Ok(())
}

#[test]
fn tiled_cache_from_default_config_drains() -> Result<(), String> {
    let mut cache = SummaryCache::new(&CacheConfig::default()).map_err(|err| err.to_string())?;
    cache.store([("a", 1)]);
    cache.store([("a", 2)]);

    let summary = cache
        .summarize(&SummarizeOptions::new())
        .map_err(|err| err.to_string())?;
    if summary.get("a/mean") != Some(&StatValue::Scalar(1.5)) {
        return Err(format!("Unexpected summary: {:?}", summary));
    }
    for key in ["a/stddev", "a/mode"] {
        if !summary.contains_key(key) {
            return Err(format!("Missing {}", key));
        }
    }
    let again = cache
        .summarize(&SummarizeOptions::new())
        .map_err(|err| err.to_string())?;
    if !again.is_empty() {
        return Err(format!("Expected empty summary, got {:?}", again));
    }
    Ok(())
}

#[test]
fn explicit_keyword_wins_over_mapping() -> Result<(), String> {
    let mut cache = rolling(3)?;
    let mut mapping = BTreeMap::new();
    mapping.insert("a".to_owned(), Sample::from(1));
    let batch = MetricsBatch::from_mapping(mapping).with("a", 2);

    cache.store(batch);
    let peeked = cache.peek(&["a"], DEFAULT_PEEK_LIMIT);
    if peeked.get("a") != Some(&vec![Sample::Scalar(2.0)]) {
        return Err(format!("Unexpected samples: {:?}", peeked));
    }
    Ok(())
}

#[test]
fn explicit_query_returns_only_named_key() -> Result<(), String> {
    let mut cache = rolling(3)?;
    cache.store([("a", 1), ("b", 2), ("c", 3)]);
    let summary = cache
        .get_stats(&StatsQuery::only(["a"]))
        .map_err(|err| err.to_string())?;
    if summary.keys().any(|key| !key.starts_with("a/")) || summary.is_empty() {
        return Err(format!("Unexpected keys: {:?}", summary.keys()));
    }
    Ok(())
}

#[test]
fn rolling_get_stats_repeats_exactly() -> Result<(), String> {
    let mut cache = rolling(8)?;
    for value in [0.25, 1.5, -3.0, 7.75] {
        cache.store([("x", Sample::from(value)), ("y", Sample::from(vec![value, 1.0]))]);
    }
    for mode in StatMode::ALL {
        let query = StatsQuery::new().mode("x", mode).mode("y", mode);
        let first = cache.get_stats(&query).map_err(|err| err.to_string())?;
        let second = cache.get_stats(&query).map_err(|err| err.to_string())?;
        if first != second {
            return Err(format!("{} summaries differ", mode));
        }
    }
    Ok(())
}

#[test]
fn every_string_key_is_stored_as_given() -> Result<(), String> {
    let mut cache = rolling(2)?;
    let touched = cache.store([("", 1), (" ", 2), ("a/b", 3)]);
    if touched != ["", " ", "a/b"] {
        return Err(format!("Unexpected touched keys: {:?}", touched));
    }
    let keys: Vec<&str> = cache.keys().collect();
    if keys != ["", " ", "a/b"] {
        return Err(format!("Unexpected stored keys: {:?}", keys));
    }
    let summary = cache
        .get_stats(&StatsQuery::new())
        .map_err(|err| err.to_string())?;
    if summary.get("/mean") != Some(&StatValue::Scalar(1.0)) {
        return Err(format!("Unexpected summary: {:?}", summary));
    }
    Ok(())
}
