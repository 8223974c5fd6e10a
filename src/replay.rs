//! Feeds JSON-lines metric records through a cache and writes summaries.
use std::io::{BufRead, Write};

use serde::Deserialize;

use crate::cache::{KeyModes, MetricsBatch, Sample, SummarizeOptions, SummaryCache};
use crate::error::{AppError, AppResult, ValidationError};

/// How a replay turns records into summaries.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Summarize after this many records; `None` summarizes at end of input.
    pub every: Option<usize>,
    pub key_modes: KeyModes,
    pub force_clear: bool,
    /// Reports the running record count under this key.
    pub step_key: Option<String>,
    /// Logs this many of the oldest samples per key before each summary.
    pub peek: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayStats {
    pub records: usize,
    pub summaries: usize,
}

/// Reads one JSON object per line (metric key to sample) from `reader`, stores
/// each record, and writes one JSON summary per line to `writer`.
///
/// Blank lines are skipped. A final summary is written for records stored
/// since the last one.
///
/// # Errors
///
/// Returns an error when a line is not a JSON object, when a key cannot be
/// reduced, or when reading or writing fails.
pub fn replay<R, W>(
    cache: &mut SummaryCache,
    reader: R,
    writer: &mut W,
    options: &ReplayOptions,
) -> AppResult<ReplayStats>
where
    R: BufRead,
    W: Write,
{
    let mut stats = ReplayStats::default();
    let mut pending = 0_usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index.saturating_add(1);
        if line.trim().is_empty() {
            continue;
        }
        let batch = parse_record(&line, line_number)?;
        cache.store(batch);
        stats.records = stats.records.saturating_add(1);
        pending = pending.saturating_add(1);

        if options.every.is_some_and(|every| pending >= every) {
            emit_summary(cache, writer, options, stats.records)?;
            stats.summaries = stats.summaries.saturating_add(1);
            pending = 0;
        }
    }

    if pending > 0 && cache.is_non_empty() {
        emit_summary(cache, writer, options, stats.records)?;
        stats.summaries = stats.summaries.saturating_add(1);
    }
    writer.flush()?;
    Ok(stats)
}

fn parse_record(line: &str, line_number: usize) -> AppResult<MetricsBatch> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    let serde_json::Value::Object(entries) = value else {
        return Err(AppError::validation(ValidationError::RecordNotObject {
            line: line_number,
        }));
    };
    let mut samples = Vec::with_capacity(entries.len());
    for (key, raw) in entries {
        samples.push((key, Sample::deserialize(raw)?));
    }
    Ok(MetricsBatch::from_mapping(samples))
}

fn emit_summary<W>(
    cache: &mut SummaryCache,
    writer: &mut W,
    options: &ReplayOptions,
    records: usize,
) -> AppResult<()>
where
    W: Write,
{
    if let Some(limit) = options.peek {
        let peeked = cache.peek::<&str>(&[], limit);
        tracing::debug!(?peeked, "Cached samples before summary");
    }

    let mut summarize = SummarizeOptions::new()
        .force_clear(options.force_clear)
        .key_modes(options.key_modes.clone());
    if let Some(step_key) = options.step_key.as_deref() {
        summarize = summarize.extra(step_key, records as u64);
    }
    let summary = cache.summarize(&summarize)?;
    serde_json::to_writer(&mut *writer, &summary)?;
    writeln!(writer)?;
    tracing::debug!(records, entries = summary.len(), "Wrote summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{RetentionPolicy, StatMode};
    use std::io::Cursor;
    use std::num::NonZeroUsize;
    use std::sync::{Arc, Mutex};

    /// Log sink shared between a scoped subscriber and the test.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> AppResult<String> {
            let bytes = self
                .0
                .lock()
                .map_err(|err| AppError::validation(format!("Log buffer poisoned: {}", err)))?;
            String::from_utf8(bytes.clone())
                .map_err(|err| AppError::validation(format!("Logs are not UTF-8: {}", err)))
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let mut bytes = self
                .0
                .lock()
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn run(
        cache: &mut SummaryCache,
        input: &str,
        options: &ReplayOptions,
    ) -> AppResult<Vec<String>> {
        let mut out = Vec::new();
        replay(cache, Cursor::new(input), &mut out, options)?;
        let text = String::from_utf8(out)
            .map_err(|err| AppError::validation(format!("Output is not UTF-8: {}", err)))?;
        Ok(text.lines().map(str::to_owned).collect())
    }

    #[test]
    fn tiled_replay_emits_every_n_records() -> AppResult<()> {
        let mut cache = SummaryCache::with_policy(RetentionPolicy::Tiled, StatMode::Mean);
        let input = "{\"a\": 1}\n{\"a\": 3}\n\n{\"a\": 10}\n";
        let options = ReplayOptions {
            every: Some(2),
            step_key: Some("step".to_owned()),
            ..ReplayOptions::default()
        };
        let lines = run(&mut cache, input, &options)?;
        let expected = [
            r#"{"a/mean":2.0,"step":2.0}"#,
            r#"{"a/mean":10.0,"step":3.0}"#,
        ];
        if lines != expected {
            return Err(AppError::validation(format!("Unexpected output: {:?}", lines)));
        }
        Ok(())
    }

    #[test]
    fn rolling_replay_summarizes_window_once_at_end() -> AppResult<()> {
        let window = NonZeroUsize::new(2).ok_or(AppError::validation("zero window"))?;
        let mut cache =
            SummaryCache::with_policy(RetentionPolicy::rolling(window), StatMode::Mean);
        let input = "{\"a\": 1}\n{\"a\": 3, \"b\": [1, 2]}\n{\"a\": 5}\n";
        let mut key_modes = KeyModes::new();
        key_modes.insert("a".to_owned(), StatMode::MinMax);
        let options = ReplayOptions {
            key_modes,
            ..ReplayOptions::default()
        };
        let lines = run(&mut cache, input, &options)?;
        let expected = [r#"{"a/max":5.0,"a/mean":4.0,"a/min":3.0,"b/mean":[1.0,2.0]}"#];
        if lines != expected {
            return Err(AppError::validation(format!("Unexpected output: {:?}", lines)));
        }
        if !cache.is_non_empty() {
            return Err(AppError::validation("Rolling cache should keep its window"));
        }
        Ok(())
    }

    #[test]
    fn replay_rejects_non_object_records() -> AppResult<()> {
        let mut cache = SummaryCache::with_policy(RetentionPolicy::Tiled, StatMode::Mean);
        let result = run(&mut cache, "{\"a\": 1}\n[1, 2]\n", &ReplayOptions::default());
        match result {
            Err(AppError::Validation(ValidationError::RecordNotObject { line: 2 })) => Ok(()),
            other => Err(AppError::validation(format!("Unexpected result: {:?}", other))),
        }
    }

    #[test]
    fn replay_surfaces_reduction_errors() -> AppResult<()> {
        let mut cache = SummaryCache::with_policy(RetentionPolicy::Tiled, StatMode::Mean);
        let result = run(&mut cache, "{\"a\": \"high\"}\n", &ReplayOptions::default());
        match result {
            Err(AppError::Cache(crate::error::CacheError::Reduction { key, .. })) if key == "a" => {
                Ok(())
            }
            other => Err(AppError::validation(format!("Unexpected result: {:?}", other))),
        }
    }

    #[test]
    fn force_clear_restarts_rolling_window_after_each_summary() -> AppResult<()> {
        let window = NonZeroUsize::new(4).ok_or(AppError::validation("zero window"))?;
        let mut cache =
            SummaryCache::with_policy(RetentionPolicy::rolling(window), StatMode::Mean);
        let input = "{\"a\": 1}\n{\"a\": 3}\n{\"a\": 10}\n";
        let options = ReplayOptions {
            every: Some(2),
            force_clear: true,
            ..ReplayOptions::default()
        };
        let lines = run(&mut cache, input, &options)?;
        let expected = [r#"{"a/mean":2.0}"#, r#"{"a/mean":10.0}"#];
        if lines != expected {
            return Err(AppError::validation(format!("Unexpected output: {:?}", lines)));
        }
        if cache.is_non_empty() {
            return Err(AppError::validation("Forced summaries should leave the cache empty"));
        }
        Ok(())
    }

    #[test]
    fn peek_logs_oldest_samples_before_summary() -> AppResult<()> {
        let mut cache = SummaryCache::with_policy(RetentionPolicy::Tiled, StatMode::Mean);
        let input = "{\"a\": 1}\n{\"a\": 3}\n";
        let options = ReplayOptions {
            peek: Some(1),
            ..ReplayOptions::default()
        };

        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let lines =
            tracing::subscriber::with_default(subscriber, || run(&mut cache, input, &options))?;

        if lines != [r#"{"a/mean":2.0}"#] {
            return Err(AppError::validation(format!("Unexpected output: {:?}", lines)));
        }
        let logs = captured.contents()?;
        if !logs.contains("Cached samples before summary")
            || !logs.contains("[Scalar(1.0)]")
            || logs.contains("Scalar(3.0)")
        {
            return Err(AppError::validation(format!("Unexpected logs: {}", logs)));
        }
        Ok(())
    }
}
