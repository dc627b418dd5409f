//! A fatal OS signal is forwarded into the pipeline with its number and a
//! stack trace. `raise` delivers synchronously to the calling thread, so a
//! recording fatal dispatch lets the test observe the handler and continue.

#![cfg(unix)]

use nix::sys::signal::{raise, Signal};
use serial_test::serial;
use vigil::test_utils::{self, CollectorSink};
use vigil::{clear_fatal_exit_handler, initialize_logging, LogWorker};

#[test]
#[serial]
fn raised_sigterm_is_captured_with_its_signal_id() {
    let worker = LogWorker::new();
    let (sink, records) = CollectorSink::new();
    let _handle = worker.add_sink(sink);
    initialize_logging(&worker);
    let fatals = test_utils::install_recording_fatal_dispatch();

    raise(Signal::SIGTERM).unwrap();

    {
        let fatals = fatals.lock().unwrap();
        assert_eq!(fatals.len(), 1);
        assert_eq!(fatals[0].signal_id, Signal::SIGTERM as i32);
        assert_eq!(fatals[0].reason(), "SIGTERM");
        assert!(fatals[0]
            .record
            .message()
            .contains("received fatal signal SIGTERM"));
    }

    // the flush performed by the dispatch delivered it to the sink as well
    assert!(records
        .lock()
        .unwrap()
        .iter()
        .any(|r| r.message().contains("received fatal signal SIGTERM")));

    clear_fatal_exit_handler();
    drop(worker);
}
