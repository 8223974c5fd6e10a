use clap::Parser;
use std::path::PathBuf;

use super::parsers::{parse_key_mode, parse_positive_usize};
use super::types::{KeyModeArg, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "summary-cache",
    version,
    about = "Replay JSON-lines metric records through a summary cache and print summaries as JSON lines."
)]
pub struct ReplayArgs {
    /// JSON-lines file of metric records (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Path to config file (TOML or JSON)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Retention mode: rolling or tiled
    #[arg(long = "mode", env = "SUMMARY_CACHE_MODE")]
    pub mode: Option<String>,

    /// Samples kept per key under rolling mode
    #[arg(long = "window", value_parser = parse_positive_usize)]
    pub window: Option<PositiveUsize>,

    /// Statistic for keys without an override (mean, min_max, std_dev, quantile, histogram)
    #[arg(long = "default-stats")]
    pub default_stats: Option<String>,

    /// Resolve statistic names by prefix (e.g. std_dev_v2 selects std_dev)
    #[arg(long = "prefix-modes")]
    pub prefix_modes: bool,

    /// Summarize after every N records (default: once, at end of input)
    #[arg(long = "every", value_parser = parse_positive_usize)]
    pub every: Option<PositiveUsize>,

    /// Per-key statistic override as KEY=MODE (repeatable)
    #[arg(long = "key-mode", value_parser = parse_key_mode)]
    pub key_modes: Vec<KeyModeArg>,

    /// Clear the cache after every summary, even in rolling mode
    #[arg(long = "force-clear")]
    pub force_clear: bool,

    /// Report the number of records read under this key in each summary
    #[arg(long = "step-key")]
    pub step_key: Option<String>,

    /// Log the oldest N samples per key before each summary
    #[arg(long = "peek", value_parser = parse_positive_usize)]
    pub peek: Option<PositiveUsize>,

    /// Enable debug logging (set SUMMARY_CACHE_LOG or RUST_LOG for filters)
    #[arg(long, short)]
    pub verbose: bool,
}
