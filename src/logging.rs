//! `log` backend for the Workers runtime.
//!
//! Records go to the isolate console, which Workers Logs / `wrangler tail`
//! collect. Installed at most once per isolate; later calls only adjust the
//! level.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), record.target(), &record.args().to_string());
        if record.level() == Level::Error {
            worker::console_error!("{line}");
        } else {
            worker::console_log!("{line}");
        }
    }

    fn flush(&self) {}
}

fn format_line(level: Level, target: &str, message: &str) -> String {
    format!("level={} module={target} {message}", level.as_str().to_ascii_lowercase())
}

pub fn init_logging(level: LevelFilter) {
    // Err means another request already installed the logger.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
