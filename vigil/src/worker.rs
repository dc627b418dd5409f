//! The log worker: owner of the background thread and the sink registry.
//!
//! The registry lives behind a mutex but is only ever touched from tasks
//! running on the worker thread, so the lock is uncontended; sinks need no
//! synchronization of their own for registry membership.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::background::Background;
use crate::config;
use crate::crash_handler;
use crate::dispatch;
use crate::errors::Result;
use crate::fatal::FatalRecord;
use crate::file_sink::FileSink;
use crate::record::LogRecord;
use crate::sink::{Sink, SinkHandle};

type SinkRegistry = Arc<Mutex<Vec<Box<dyn Sink>>>>;

pub(crate) struct WorkerCore {
    bg: Arc<Background>,
    sinks: SinkRegistry,
}

impl WorkerCore {
    pub(crate) fn save(&self, record: LogRecord) {
        let sinks = Arc::clone(&self.sinks);
        let _ = self.bg.send(Box::new(move || bg_save(&sinks, record)));
    }

    pub(crate) fn fatal(&self, fatal: FatalRecord) {
        let sinks = Arc::clone(&self.sinks);
        let _ = self.bg.send(Box::new(move || bg_fatal(&sinks, fatal)));
    }

    /// Wait until every previously queued task has run.
    pub(crate) fn flush(&self) -> Result<()> {
        self.bg.call(|| ()).wait()
    }
}

/// The background logger. Owned by application code; `initialize_logging`
/// links the process-wide macros to it. Dropping the worker flushes every
/// queued record to every sink, then joins the thread.
pub struct LogWorker {
    core: Arc<WorkerCore>,
}

impl LogWorker {
    pub fn new() -> Self {
        Self {
            core: Arc::new(WorkerCore {
                bg: Arc::new(Background::spawn("vigil-logger")),
                sinks: Arc::new(Mutex::new(Vec::new())),
            }),
        }
    }

    pub(crate) fn core(&self) -> &Arc<WorkerCore> {
        &self.core
    }

    /// Queue a record for delivery to every registered sink.
    pub fn save(&self, record: LogRecord) {
        self.core.save(record);
    }

    /// Queue the terminal fatal task; the worker flushes and exits the
    /// process afterwards.
    pub fn fatal(&self, fatal: FatalRecord) {
        self.core.fatal(fatal);
    }

    /// Register a sink. Registration is complete when this returns; records
    /// queued afterwards reach the sink in order.
    pub fn add_sink<S: Sink + 'static>(&self, sink: S) -> SinkHandle<S> {
        let (handle, entry) = SinkHandle::new(sink, Arc::downgrade(&self.core.bg));
        let entry: Box<dyn Sink> = Box::new(entry);
        let sinks = Arc::clone(&self.core.sinks);
        let _ = self
            .core
            .bg
            .call(move || sinks.lock().unwrap().push(entry))
            .wait();
        handle
    }

    /// Register the default file sink for `argv0`, writing into
    /// `log_directory` (or the configured log dir when empty) with the
    /// conventional `<binary>.<host>.<user>[.<id>].YYYYMMDD-HHMMSS.log`
    /// name.
    pub fn add_default_logger(
        &self,
        argv0: &str,
        log_directory: &str,
        logger_id: &str,
    ) -> Result<SinkHandle<FileSink>> {
        let prefix = default_log_prefix(argv0);
        let directory = if log_directory.is_empty() {
            config::log_dir()
        } else {
            log_directory.to_owned()
        };
        let sink = FileSink::new(&prefix, &directory, logger_id)?;
        Ok(self.add_sink(sink))
    }
}

impl Default for LogWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LogWorker {
    fn drop(&mut self) {
        dispatch::shutdown_for_active_only(&self.core);

        // The clearing task flushes every record queued before it (FIFO) and
        // releases the sinks on the worker thread. Waiting here means no
        // record submitted before shutdown slips past a live sink.
        let sinks = Arc::clone(&self.core.sinks);
        let _ = self
            .core
            .bg
            .call(move || sinks.lock().unwrap().clear())
            .wait();
        // dropping `core` disconnects the queue and joins the thread
    }
}

fn bg_save(sinks: &Mutex<Vec<Box<dyn Sink>>>, record: LogRecord) {
    let replace_with_stderr = config::log_to_stderr();
    let mirror = config::also_log_to_stderr() || record.level.value >= config::stderr_threshold();
    if replace_with_stderr || mirror {
        eprintln!("{record}");
    }
    if replace_with_stderr {
        return;
    }
    let mut sinks = sinks.lock().unwrap();
    if sinks.is_empty() {
        eprintln!("vigil worker has no sinks. Message: [{record}]");
        return;
    }
    for sink in sinks.iter_mut() {
        sink.receive(record.clone());
    }
}

fn bg_fatal(sinks: &Mutex<Vec<Box<dyn Sink>>>, fatal: FatalRecord) -> ! {
    // Only the active worker can receive a fatal record, so the process-wide
    // slot can be closed before flushing.
    dispatch::shutdown_logging();

    let reason = fatal.reason();
    let FatalRecord { mut record, signal_id } = fatal;
    let level = record.level;
    {
        let body = record.write();
        body.push_str("\nExiting after fatal event (");
        body.push_str(level.text);
        body.push_str("). Fatal type: ");
        body.push_str(&reason);
        body.push_str("\nLog content flushed successfully to sink\n\n");
    }

    eprintln!("{record}");
    let mut sinks = sinks.lock().unwrap();
    for sink in sinks.iter_mut() {
        sink.receive(record.clone());
    }
    // every sink has now returned from its final receive
    sinks.clear();
    drop(sinks);

    crash_handler::exit_with_default_signal_handler(level, signal_id)
}

fn default_log_prefix(argv0: &str) -> String {
    let short_name = Path::new(argv0)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| argv0.to_owned());
    let hostname =
        whoami::fallible::hostname().unwrap_or_else(|_| String::from("unknown-host"));
    format!("{short_name}.{hostname}.{}", whoami::username())
}
