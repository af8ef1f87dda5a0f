//! Minimal stderr backend for the `log` facade, installed by the CLI.

use log::{Level, LevelFilter, Log, Metadata, Record};

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
        match record.level() {
            Level::Info => eprintln!("{}", record.args()),
            level => eprintln!("[{}] {}", level, record.args()),
        }
    }

    fn flush(&self) {}
}

/// Install the logger. `verbose` lowers the threshold from `Info` to `Trace`.
///
/// Calling this twice keeps the first logger and only updates the level.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Trace } else { LevelFilter::Info };
    // set_logger only fails when a logger is already installed
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
