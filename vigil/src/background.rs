//! Single-consumer background task executor.
//!
//! One dedicated OS thread drains an unbounded FIFO of closures. Producers
//! never wait on submission; a completion token is available for callers
//! that need the result of a task.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::errors::{Error, Result};

pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

pub struct Background {
    tx: Option<Sender<Task>>,
    handle: Option<JoinHandle<()>>,
}

impl Background {
    pub fn spawn(name: &str) -> Self {
        let (tx, rx) = unbounded::<Task>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_loop(&rx))
            .expect("failed to spawn background thread");
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Enqueue a task. Tasks run strictly in submission order; a submission
    /// after shutdown reports [`Error::NoActiveWorker`].
    pub(crate) fn send(&self, task: Task) -> Result<()> {
        match &self.tx {
            Some(tx) => tx.send(task).map_err(|_| Error::NoActiveWorker),
            None => Err(Error::NoActiveWorker),
        }
    }

    /// Enqueue a task and hand back a completion token for its result.
    pub fn call<F, R>(&self, f: F) -> Answer<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (done_tx, done_rx) = bounded(1);
        let task: Task = Box::new(move || {
            let _ = done_tx.send(f());
        });
        match self.send(task) {
            Ok(()) => Answer {
                inner: AnswerInner::Pending(done_rx),
            },
            Err(e) => Answer::failed(e),
        }
    }
}

impl Drop for Background {
    fn drop(&mut self) {
        // disconnect, let the thread drain whatever is queued, then join
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop(rx: &Receiver<Task>) {
    while let Ok(task) = rx.recv() {
        task();
    }
}

/// Completion token for a submitted task.
///
/// Dropping the token never cancels the task; waiting on a token obtained
/// from a missing worker resolves with [`Error::NoActiveWorker`].
pub struct Answer<R> {
    inner: AnswerInner<R>,
}

enum AnswerInner<R> {
    Pending(Receiver<R>),
    Failed(Error),
}

impl<R> Answer<R> {
    pub(crate) fn failed(error: Error) -> Self {
        Self {
            inner: AnswerInner::Failed(error),
        }
    }

    /// Block until the task has run and yield its result.
    pub fn wait(self) -> Result<R> {
        match self.inner {
            AnswerInner::Pending(rx) => rx.recv().map_err(|_| Error::TaskDropped),
            AnswerInner::Failed(e) => Err(e),
        }
    }
}
