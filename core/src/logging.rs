//! Console logger used by the desktop shell.
//!
//! Lines look like `[qa-report-builder] INFO message` on stderr.

use log::{Level, LevelFilter, Log, Metadata, Record};

pub const LOG_ENV: &str = "QA_REPORT_LOG";

pub struct PrefixLogger {
    prefix: &'static str,
    level: LevelFilter,
}

impl PrefixLogger {
    pub fn new(prefix: &'static str, level: LevelFilter) -> Self {
        Self { prefix, level }
    }

    pub fn format(&self, level: Level, message: &str) -> String {
        format!("[{}] {} {}", self.prefix, level, message)
    }
}

impl Log for PrefixLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", self.format(record.level(), &record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Level from `QA_REPORT_LOG` (`error` .. `trace`, `off`); `info` otherwise.
pub fn level_from_env() -> LevelFilter {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Installs the logger once; later calls are ignored.
pub fn init(prefix: &'static str) {
    let level = level_from_env();
    if log::set_boxed_logger(Box::new(PrefixLogger::new(prefix, level))).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_prefix() {
        let logger = PrefixLogger::new("qa-report-builder", LevelFilter::Info);
        assert_eq!(
            logger.format(Level::Warn, "upload rejected"),
            "[qa-report-builder] WARN upload rejected"
        );
    }

    #[test]
    fn respects_level() {
        let logger = PrefixLogger::new("x", LevelFilter::Warn);
        let debug = Metadata::builder().level(Level::Debug).build();
        let error = Metadata::builder().level(Level::Error).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&error));
    }
}
