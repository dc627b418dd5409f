//! Helpers for exercising the framework from tests: an in-memory collector
//! sink and fatal dispatches that record or unwind instead of terminating.

use std::sync::{Arc, Mutex};

use crate::dispatch;
use crate::fatal::{self, FatalRecord, FatalUnwind};
use crate::record::LogRecord;
use crate::sink::Sink;

/// Collects every received record for later inspection.
pub struct CollectorSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CollectorSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<LogRecord>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                records: Arc::clone(&records),
            },
            records,
        )
    }
}

impl Sink for CollectorSink {
    fn receive(&mut self, record: LogRecord) {
        self.records.lock().unwrap().push(record);
    }
}

/// Fatal dispatch that delivers the fatal record through the normal queue
/// (so it lands after everything submitted before it), waits for the worker
/// to catch up, then unwinds out of the capture site with [`FatalUnwind`].
pub fn install_unwinding_fatal_dispatch() {
    fatal::set_fatal_exit_handler(|fatal: FatalRecord| {
        let _ = dispatch::push_record_and_flush(fatal.record.clone());
        std::panic::panic_any(FatalUnwind(fatal));
    });
}

/// Fatal dispatch that delivers the fatal record through the normal queue
/// and stores it, letting the caller continue. Returns the store.
pub fn install_recording_fatal_dispatch() -> Arc<Mutex<Vec<FatalRecord>>> {
    let store = Arc::new(Mutex::new(Vec::new()));
    let sink_store = Arc::clone(&store);
    fatal::set_fatal_exit_handler(move |fatal: FatalRecord| {
        let _ = dispatch::push_record_and_flush(fatal.record.clone());
        sink_store.lock().unwrap().push(fatal);
    });
    store
}
