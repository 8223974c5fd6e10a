#![expect(
    clippy::float_arithmetic,
    reason = "Statistics are computed over f64 samples."
)]

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayD, ArrayView1, ArrayViewD, Axis};

use crate::error::{ConfigError, ReductionError};

use super::types::StatValue;

/// Number of equal-width bins produced by the histogram mode.
pub const HISTOGRAM_BINS: usize = 10;
/// Percentiles reported by the quantile mode, paired with their suffix.
const QUANTILES: [(&str, f64); 5] = [
    ("0", 0.0),
    ("25", 25.0),
    ("mean", 50.0),
    ("75", 75.0),
    ("100", 100.0),
];
const PERCENT: f64 = 100.0;
const HALF: f64 = 0.5;

/// The statistic computed for a key when it is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum StatMode {
    Mean,
    MinMax,
    #[default]
    StdDev,
    Quantile,
    Histogram,
}

impl StatMode {
    pub const ALL: [StatMode; 5] = [
        StatMode::Mean,
        StatMode::MinMax,
        StatMode::StdDev,
        StatMode::Quantile,
        StatMode::Histogram,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StatMode::Mean => "mean",
            StatMode::MinMax => "min_max",
            StatMode::StdDev => "std_dev",
            StatMode::Quantile => "quantile",
            StatMode::Histogram => "histogram",
        }
    }

    /// Suffixes this mode writes under `"<key>/"`, in output order.
    #[must_use]
    pub const fn suffixes(self) -> &'static [&'static str] {
        match self {
            StatMode::Mean => &["mean"],
            StatMode::MinMax => &["min", "max", "mean"],
            StatMode::StdDev => &["stddev", "mean", "mode"],
            StatMode::Quantile => &["0", "25", "mean", "75", "100"],
            StatMode::Histogram => &["hist", "divs"],
        }
    }

    /// Parses a mode name under the given matching rule.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownStatMode` when no mode matches.
    pub fn parse(value: &str, matching: ModeMatching) -> Result<Self, ConfigError> {
        let found = match matching {
            ModeMatching::Exact => StatMode::ALL
                .into_iter()
                .find(|mode| mode.as_str() == value),
            ModeMatching::Prefix => StatMode::ALL
                .into_iter()
                .find(|mode| value.starts_with(mode.as_str())),
        };
        found.ok_or_else(|| ConfigError::UnknownStatMode {
            value: value.to_owned(),
        })
    }
}

impl FromStr for StatMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatMode::parse(s, ModeMatching::Exact)
    }
}

impl fmt::Display for StatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How mode names given as strings are resolved.
///
/// `Prefix` accepts names such as `std_dev_v2` for `std_dev`; it exists for
/// callers that tag mode names with a suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeMatching {
    #[default]
    Exact,
    Prefix,
}

impl ModeMatching {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ModeMatching::Exact => "exact",
            ModeMatching::Prefix => "prefix",
        }
    }
}

impl FromStr for ModeMatching {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(ModeMatching::Exact),
            "prefix" => Ok(ModeMatching::Prefix),
            other => Err(ConfigError::UnsupportedModeMatching {
                value: other.to_owned(),
            }),
        }
    }
}

/// Reduces `samples` (axis 0 is the sample axis, at least one row) with `mode`.
///
/// Returns `(suffix, value)` pairs in the order of `StatMode::suffixes`.
pub(crate) fn reduce(
    mode: StatMode,
    samples: &ArrayD<f64>,
) -> Result<Vec<(&'static str, StatValue)>, ReductionError> {
    let reduced = match mode {
        StatMode::Mean => vec![("mean", mean(samples))],
        StatMode::MinMax => vec![
            ("min", per_column(samples, min)),
            ("max", per_column(samples, max)),
            ("mean", mean(samples)),
        ],
        StatMode::StdDev => vec![
            (
                "stddev",
                StatValue::from_reduced(samples.std_axis(Axis(0), 0.0)),
            ),
            ("mean", mean(samples)),
            ("mode", per_column(samples, most_frequent)),
        ],
        StatMode::Quantile => QUANTILES
            .into_iter()
            .map(|(suffix, q)| {
                (
                    suffix,
                    per_column(samples, |column| percentile(column, q)),
                )
            })
            .collect(),
        StatMode::Histogram => {
            let (counts, edges) = histogram(samples.view())?;
            vec![
                ("hist", StatValue::Array(counts.into_dyn())),
                ("divs", StatValue::Array(edges.into_dyn())),
            ]
        }
    };
    Ok(reduced)
}

fn mean(samples: &ArrayD<f64>) -> StatValue {
    samples
        .mean_axis(Axis(0))
        .map_or(StatValue::Scalar(f64::NAN), StatValue::from_reduced)
}

/// Applies `reduce_column` to every lane along the sample axis, keeping the
/// trailing shape.
fn per_column<F>(samples: &ArrayD<f64>, reduce_column: F) -> StatValue
where
    F: Fn(ArrayView1<'_, f64>) -> f64,
{
    StatValue::from_reduced(samples.map_axis(Axis(0), reduce_column))
}

fn min(values: ArrayView1<'_, f64>) -> f64 {
    fold_nan(values.iter().copied(), f64::min)
}

fn max(values: ArrayView1<'_, f64>) -> f64 {
    fold_nan(values.iter().copied(), f64::max)
}

/// Folds with `pick`, but any NaN makes the result NaN.
fn fold_nan<I>(values: I, pick: fn(f64, f64) -> f64) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .reduce(|acc, value| {
            if acc.is_nan() || value.is_nan() {
                f64::NAN
            } else {
                pick(acc, value)
            }
        })
        .unwrap_or(f64::NAN)
}

/// Sorted copy of `values`, or `None` when any value is NaN.
fn sorted_without_nan(values: ArrayView1<'_, f64>) -> Option<Vec<f64>> {
    if values.iter().any(|value| value.is_nan()) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted)
}

/// Most frequent value; the smallest one wins a tie.
fn most_frequent(values: ArrayView1<'_, f64>) -> f64 {
    let Some(sorted) = sorted_without_nan(values) else {
        return f64::NAN;
    };

    let mut best: Option<(f64, usize)> = None;
    let mut run: Option<(f64, usize)> = None;
    for value in sorted {
        run = match run {
            Some((current, count)) if current.partial_cmp(&value) == Some(Ordering::Equal) => {
                Some((current, count.saturating_add(1)))
            }
            Some(_) | None => Some((value, 1)),
        };
        if let Some((current, count)) = run {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((current, count));
            }
        }
    }
    best.map_or(f64::NAN, |(value, _)| value)
}

/// Percentile `q` (0..=100) with linear interpolation between closest ranks.
fn percentile(values: ArrayView1<'_, f64>, q: f64) -> f64 {
    let Some(sorted) = sorted_without_nan(values) else {
        return f64::NAN;
    };
    if sorted.is_empty() {
        return f64::NAN;
    }

    let last = sorted.len().saturating_sub(1);
    let rank = q / PERCENT * last as f64;
    let lower_rank = rank.floor();
    let fraction = rank - lower_rank;
    let lower_index = (lower_rank as usize).min(last);
    let upper_index = lower_index.saturating_add(1).min(last);
    let lower = sorted.get(lower_index).copied().unwrap_or(f64::NAN);
    let upper = sorted.get(upper_index).copied().unwrap_or(lower);
    if fraction <= 0.0 {
        lower
    } else {
        lower + (upper - lower) * fraction
    }
}

/// Equal-width histogram over all values.
///
/// Returns bin counts and the `HISTOGRAM_BINS + 1` bin edges. The last bin is
/// closed on the right. A zero-width range is widened by half a unit on each
/// side; an empty input uses `[0, 1]`.
fn histogram(values: ArrayViewD<'_, f64>) -> Result<(Array1<f64>, Array1<f64>), ReductionError> {
    let (mut low, mut high) = if values.is_empty() {
        (0.0, 1.0)
    } else {
        (
            fold_nan(values.iter().copied(), f64::min),
            fold_nan(values.iter().copied(), f64::max),
        )
    };
    if !low.is_finite() || !high.is_finite() {
        return Err(ReductionError::NonFiniteRange {
            min: low,
            max: high,
        });
    }
    if high <= low {
        low -= HALF;
        high += HALF;
    }

    let bins = HISTOGRAM_BINS as f64;
    let step = (high - low) / bins;
    let mut edges: Vec<f64> = (0..HISTOGRAM_BINS)
        .map(|index| low + index as f64 * step)
        .collect();
    edges.push(high);

    let last_bin = HISTOGRAM_BINS.saturating_sub(1);
    let scale = bins / (high - low);
    let mut counts = Array1::<f64>::zeros(HISTOGRAM_BINS);
    for &value in &values {
        let mut bin = (((value - low) * scale) as usize).min(last_bin);
        if edges.get(bin).is_some_and(|edge| value < *edge) {
            bin = bin.saturating_sub(1);
        }
        let next_edge = bin.saturating_add(1);
        if bin != last_bin && edges.get(next_edge).is_some_and(|edge| value >= *edge) {
            bin = next_edge;
        }
        if let Some(count) = counts.get_mut(bin) {
            *count += 1.0;
        }
    }

    Ok((counts, Array1::from(edges)))
}
