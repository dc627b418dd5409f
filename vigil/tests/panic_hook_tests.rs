//! The opt-in panic hook logs panics as fatal records. Isolated binary —
//! the hook is process-global.

use std::panic;

use vigil::test_utils::{self, CollectorSink};
use vigil::{clear_fatal_exit_handler, initialize_logging, install_panic_hook, LogWorker};

#[test]
fn panics_become_fatal_records() {
    let worker = LogWorker::new();
    let (sink, records) = CollectorSink::new();
    let _handle = worker.add_sink(sink);
    initialize_logging(&worker);
    let fatals = test_utils::install_recording_fatal_dispatch();
    install_panic_hook();

    let result = panic::catch_unwind(|| {
        panic!("something irrecoverable happened");
    });
    assert!(result.is_err());

    {
        let fatals = fatals.lock().unwrap();
        assert_eq!(fatals.len(), 1);
        assert_eq!(fatals[0].signal_id, 0);
        assert!(fatals[0]
            .record
            .message()
            .contains("something irrecoverable happened"));
    }
    assert!(records
        .lock()
        .unwrap()
        .iter()
        .any(|r| r.message().starts_with("panic:")));

    clear_fatal_exit_handler();
    drop(worker);
}
