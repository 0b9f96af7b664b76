//! Logging setup.
//!
//! `RUST_LOG` wins when set. Otherwise `-q` selects error, `-v` debug and
//! `-vv` trace. At the default level the resolver only logs warnings, so
//! stage chatter does not interleave with the interactive menu.

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

const RESOLVER_MODULE: &str = "dupsweep::resolver";

/// Initialize logging from the `-v` count and `-q` flag.
///
/// A second call is a no-op.
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        let level = determine_level(verbose, quiet);
        builder.filter_level(level);
        if let Some(quieter) = resolver_level(level) {
            builder.filter_module(RESOLVER_MODULE, quieter);
        }
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// The resolver's own filter, quieter than `level` only at the default.
fn resolver_level(level: LevelFilter) -> Option<LevelFilter> {
    (level == LevelFilter::Info).then_some(LevelFilter::Warn)
}

// Debug builds prefix a timestamp (and the module path with -v).
fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_level_default() {
        assert_eq!(determine_level(0, false), LevelFilter::Info);
    }

    #[test]
    fn test_determine_level_verbose() {
        assert_eq!(determine_level(1, false), LevelFilter::Debug);
        assert_eq!(determine_level(2, false), LevelFilter::Trace);
        assert_eq!(determine_level(5, false), LevelFilter::Trace);
    }

    #[test]
    fn test_determine_level_quiet_overrides_verbose() {
        assert_eq!(determine_level(0, true), LevelFilter::Error);
        assert_eq!(determine_level(2, true), LevelFilter::Error);
    }

    #[test]
    fn test_resolver_quieter_only_at_default_level() {
        assert_eq!(resolver_level(LevelFilter::Info), Some(LevelFilter::Warn));
        assert_eq!(resolver_level(LevelFilter::Debug), None);
        assert_eq!(resolver_level(LevelFilter::Error), None);
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(0, false);
        init_logging(2, false);
    }
}
