//! Logger setup on top of `env_logger`.
//!
//! The library only emits `log` records; the binary installs the backend.
//! Records go to stderr so they never mix with reports on stdout, and
//! `RUST_LOG` refines the level picked on the command line.

use env_logger::{Builder, Target};
use log::{LevelFilter, SetLoggerError};
use std::io::Write;

/// A stderr logger builder at `level`, formatted as `[LEVEL target] message`.
pub fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{:<5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        });
    builder
}

/// Installs the global logger. Fails if one is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    builder(level).try_init()
}

/// Maps `-v` occurrences and `--quiet` to a level filter.
pub fn level_from_verbosity(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from_verbosity(0, false), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(2, false), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9, false), LevelFilter::Trace);
        assert_eq!(level_from_verbosity(3, true), LevelFilter::Error);
    }

    #[test]
    fn test_second_init_is_rejected() {
        let _ = builder(LevelFilter::Debug).is_test(true).try_init();
        assert!(init(LevelFilter::Warn).is_err());
    }
}
