//! The sink trait and the typed handle returned on registration.

use std::sync::{Arc, Mutex, Weak};

use crate::background::{Answer, Background};
use crate::errors::Error;
use crate::record::LogRecord;

/// A consumer of log records.
///
/// `receive` runs on the worker thread and takes ownership of its own clone
/// of the record; sinks are free to mutate it. A slow sink backs up the
/// single queue — back-pressure is the implementer's concern.
pub trait Sink: Send {
    fn receive(&mut self, record: LogRecord);
}

/// Registry entry sharing the sink object with its handle.
pub(crate) struct SharedSink<S: Sink> {
    inner: Arc<Mutex<S>>,
}

impl<S: Sink> Sink for SharedSink<S> {
    fn receive(&mut self, record: LogRecord) {
        self.inner.lock().unwrap().receive(record);
    }
}

/// Capability returned by `LogWorker::add_sink`.
///
/// Besides keeping the sink registered, the handle exposes the sink's own
/// methods as asynchronous calls executed on the worker thread.
pub struct SinkHandle<S: Sink> {
    sink: Arc<Mutex<S>>,
    worker: Weak<Background>,
}

impl<S: Sink + 'static> SinkHandle<S> {
    pub(crate) fn new(sink: S, worker: Weak<Background>) -> (Self, SharedSink<S>) {
        let sink = Arc::new(Mutex::new(sink));
        let entry = SharedSink {
            inner: Arc::clone(&sink),
        };
        (Self { sink, worker }, entry)
    }

    /// Run `f` against the sink on the worker thread.
    ///
    /// The returned token resolves with the closure's result, or with
    /// [`Error::NoActiveWorker`] when the worker is gone.
    pub fn call<F, R>(&self, f: F) -> Answer<R>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        match self.worker.upgrade() {
            Some(bg) => {
                let sink = Arc::clone(&self.sink);
                bg.call(move || {
                    let mut guard = sink.lock().unwrap();
                    f(&mut *guard)
                })
            }
            None => Answer::failed(Error::NoActiveWorker),
        }
    }
}
