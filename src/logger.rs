use std::io::Write;
use std::time::{Duration, Instant};

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

struct EngagorLogger {
    file: Option<Mutex<std::fs::File>>,
    filter: LevelFilter,
    start: Instant,
}

/// Render one log line as `[elapsed] [LEVEL] target - message`.
#[must_use]
pub fn format_line(elapsed: Duration, record: &Record) -> String {
    format!(
        "[{:.3}s] [{}] {} - {}",
        elapsed.as_secs_f64(),
        record.level(),
        record.target(),
        record.args()
    )
}

impl Log for EngagorLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(self.start.elapsed(), record);
        eprintln!("{line}");

        // Also write to file if configured
        if let Some(ref file) = self.file {
            let _ = writeln!(file.lock(), "{line}");
        }
    }

    fn flush(&self) {
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Pick the level filter: `RUST_LOG` wins, then `verbose`, then warnings only.
#[must_use]
pub fn level_filter(rust_log: Option<&str>, verbose: bool) -> LevelFilter {
    rust_log
        .and_then(|s| s.parse().ok())
        .unwrap_or(if verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        })
}

/// Initialize the global logger. Must be called once before any logging.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init(log_file: Option<std::fs::File>, verbose: bool) {
    let filter = level_filter(std::env::var("RUST_LOG").ok().as_deref(), verbose);

    let logger = EngagorLogger {
        file: log_file.map(Mutex::new),
        filter,
        start: Instant::now(),
    };

    log::set_boxed_logger(Box::new(logger)).expect("logger already initialized");
    log::set_max_level(filter);
}
