//! Minimal stderr backend for the `log` facade.

use log::{Level, LevelFilter, Log, Metadata, Record};

const LOG_ENV: &str = "QRSHEET_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let label = match record.level() {
            Level::Error => "Error",
            Level::Warn => "Warning",
            Level::Info => "Info",
            Level::Debug => "Debug",
            Level::Trace => "Trace",
        };
        eprintln!("{}: {}", label, record.args());
    }

    fn flush(&self) {}
}

/// Level for `verbosity` repetitions of `-v`, or `QRSHEET_LOG` when no `-v`
/// was given. Defaults to warnings only.
pub fn level_filter(verbosity: u8, env_value: Option<&str>) -> LevelFilter {
    match verbosity {
        0 => env_value
            .and_then(|v| v.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: u8) {
    let env_value = std::env::var(LOG_ENV).ok();
    let level = level_filter(verbosity, env_value.as_deref());
    // Only fails if a logger is already installed.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(0, None), LevelFilter::Warn);
        assert_eq!(level_filter(0, Some("debug")), LevelFilter::Debug);
        assert_eq!(level_filter(0, Some("nonsense")), LevelFilter::Warn);
        assert_eq!(level_filter(1, Some("error")), LevelFilter::Info);
        assert_eq!(level_filter(2, None), LevelFilter::Debug);
        assert_eq!(level_filter(5, None), LevelFilter::Trace);
    }
}
