//! Asynchronous logging and design-by-contract framework.
//!
//! Producer threads hand finished records to a single background worker
//! through an unbounded FIFO; the worker fans each record out to every
//! registered sink. Fatal events — broken contracts, `fatal!` records,
//! intercepted panics — flush everything already queued to every sink
//! before the process exits with the originating signal.
//!
//! # Examples
//! ```
//! use vigil::{info, check_eq, initialize_logging, LogWorker};
//! use vigil::test_utils::CollectorSink;
//!
//! let worker = LogWorker::new();
//! let (sink, records) = CollectorSink::new();
//! let handle = worker.add_sink(sink);
//! initialize_logging(&worker);
//!
//! info!("hello from {}", "vigil");
//! check_eq!(2, 2);
//!
//! // wait for the worker to catch up, then inspect
//! handle.call(|_| ()).wait().unwrap();
//! assert!(records.lock().unwrap()[0].message().contains("hello"));
//! ```

pub mod background;
pub mod capture;
pub mod config;
pub mod contracts;
pub mod crash_handler;
pub mod dispatch;
pub mod errors;
pub mod fatal;
pub mod file_sink;
pub mod levels;
pub mod log_interop;
pub mod record;
pub mod sink;
pub mod test_utils;
pub mod worker;

#[macro_use]
mod macros;

pub use background::Answer;
pub use capture::LogCapture;
pub use crash_handler::install_panic_hook;
pub use dispatch::{initialize_logging, is_logging_initialized, log_enabled, shutdown_logging};
pub use errors::{Error, Result};
pub use fatal::{
    clear_fatal_exit_handler, set_fatal_exit_handler, set_fatal_pre_logging_hook, FatalRecord,
    FatalUnwind,
};
pub use file_sink::FileSink;
pub use levels::Level;
pub use log_interop::install_log_interop;
pub use record::{set_max_message_size, LogRecord};
pub use sink::{Sink, SinkHandle};
pub use worker::LogWorker;

pub mod prelude {
    pub use crate::levels::{CONTRACT, DEBUG, ERROR, FATAL, INFO, WARNING};
    pub use crate::{
        check, check_eq, check_ge, check_gt, check_le, check_lt, check_ne, checkf, debug, error,
        fatal, info, log, log_every_n, log_if, logf, vlog, warning,
    };
    pub use crate::{initialize_logging, LogWorker, Sink};
}
