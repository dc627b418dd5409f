//! Bridge from the `log` facade into the dispatcher, so crates logging
//! through `log::info!` and friends reach the same sinks.

use crate::capture::LogCapture;
use crate::dispatch;
use crate::levels::{self, Level};

struct LogFacade;

fn facade_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => levels::ERROR,
        log::Level::Warn => levels::WARNING,
        log::Level::Info => levels::INFO,
        log::Level::Debug | log::Level::Trace => levels::DEBUG,
    }
}

impl log::Log for LogFacade {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        dispatch::log_enabled(facade_level(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = facade_level(record.level());
        if !dispatch::log_enabled(level) {
            return;
        }
        let mut capture = LogCapture::new(
            record.file_static().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.module_path_static().unwrap_or("unknown"),
            level,
        );
        capture.capturef(record.args().as_str().unwrap_or(""), *record.args());
    }

    fn flush(&self) {}
}

/// Register the facade bridge. Safe to call once per process; a second
/// logger registration is reported on stderr and ignored.
pub fn install_log_interop() {
    static FACADE: LogFacade = LogFacade;
    log::set_max_level(log::LevelFilter::Trace);
    if let Err(e) = log::set_logger(&FACADE) {
        eprintln!("vigil: could not install the log facade bridge: {e}");
    }
}
