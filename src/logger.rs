use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV: &str = "SUMMARY_CACHE_LOG";

/// Installs the global subscriber. Logs go to stderr so stdout carries only
/// summaries.
pub fn init_logging(verbose: bool) {
    let configured = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(pick_filter(configured.as_deref(), verbose))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// A configured directive wins over `--verbose`; an unparsable one falls back
/// to `info`.
fn pick_filter(configured: Option<&str>, verbose: bool) -> EnvFilter {
    match configured {
        Some(directive) => {
            EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
        }
        None if verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("info"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn verbose_only_applies_without_directive() -> Result<(), String> {
        let cases = [
            (None, false, LevelFilter::INFO),
            (None, true, LevelFilter::DEBUG),
            (Some("warn"), true, LevelFilter::WARN),
            (Some("summary_cache=trace"), false, LevelFilter::TRACE),
            (Some("summary_cache=loud"), true, LevelFilter::INFO),
        ];
        for (directive, verbose, expected) in cases {
            let found = pick_filter(directive, verbose).max_level_hint();
            if found != Some(expected) {
                return Err(format!(
                    "{:?} (verbose={}) gave {:?}, expected {:?}",
                    directive, verbose, found, expected
                ));
            }
        }
        Ok(())
    }

    #[test]
    fn init_logging_twice_keeps_first_subscriber() {
        init_logging(false);
        init_logging(true);
    }
}
