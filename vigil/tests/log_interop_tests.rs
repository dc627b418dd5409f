//! Records emitted through the `log` facade land in the same sinks.

use vigil::test_utils::CollectorSink;
use vigil::{initialize_logging, install_log_interop, LogWorker};

#[test]
fn facade_records_reach_registered_sinks() {
    let worker = LogWorker::new();
    let (sink, records) = CollectorSink::new();
    let handle = worker.add_sink(sink);
    initialize_logging(&worker);
    install_log_interop();

    log::info!("via the facade: {}", 42);
    log::warn!("facade warning");

    handle.call(|_| ()).wait().unwrap();
    let records = records.lock().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].message().contains("via the facade: 42"));
    assert_eq!(records[0].level, vigil::levels::INFO);
    assert_eq!(records[1].level, vigil::levels::WARNING);
    assert!(records[0].file.ends_with("log_interop_tests.rs"));
}
