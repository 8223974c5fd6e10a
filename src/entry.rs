use std::fs::File;
use std::io::BufReader;

use clap::{CommandFactory, FromArgMatches};

use summary_cache::args::{PositiveUsize, ReplayArgs};
use summary_cache::cache::{KeyModes, ModeMatching, RetentionPolicy, SummaryCache};
use summary_cache::config::{CacheConfig, load_config};
use summary_cache::error::AppResult;
use summary_cache::replay::{ReplayOptions, replay};

pub(crate) fn run() -> AppResult<()> {
    let args = parse_args()?;
    crate::logger::init_logging(args.verbose);

    let config = build_config(&args)?;
    let mut cache = SummaryCache::new(&config)?;
    let options = replay_options(&args, &cache)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let stats = match args.input.as_deref() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Reading metric records");
            let file = File::open(path)?;
            replay(&mut cache, BufReader::new(file), &mut out, &options)?
        }
        None => replay(&mut cache, std::io::stdin().lock(), &mut out, &options)?,
    };

    tracing::info!(
        records = stats.records,
        summaries = stats.summaries,
        "Replay finished"
    );
    Ok(())
}

fn parse_args() -> AppResult<ReplayArgs> {
    let matches = ReplayArgs::command().get_matches();
    Ok(ReplayArgs::from_arg_matches(&matches)?)
}

/// Config file values, overridden by any flag given on the command line.
fn build_config(args: &ReplayArgs) -> AppResult<CacheConfig> {
    let mut config = load_config(args.config.as_deref())?.unwrap_or_default();
    if let Some(mode) = args.mode.as_ref() {
        config.mode.clone_from(mode);
        // Tiled mode takes no window, so drop one inherited from the file.
        if mode == RetentionPolicy::Tiled.as_str() {
            config.window = None;
        }
    }
    if let Some(window) = args.window {
        config.window = Some(window.get());
    }
    if let Some(default_stats) = args.default_stats.as_ref() {
        config.default_stats.clone_from(default_stats);
    }
    if args.prefix_modes {
        config = config.with_mode_matching(ModeMatching::Prefix);
    }
    Ok(config)
}

fn replay_options(args: &ReplayArgs, cache: &SummaryCache) -> AppResult<ReplayOptions> {
    let mut key_modes = KeyModes::new();
    for key_mode in &args.key_modes {
        key_modes.insert(key_mode.key.clone(), cache.parse_mode(&key_mode.mode)?);
    }
    Ok(ReplayOptions {
        every: args.every.map(PositiveUsize::get),
        key_modes,
        force_clear: args.force_clear,
        step_key: args.step_key.clone(),
        peek: args.peek.map(PositiveUsize::get),
    })
}
