//! Producer-side capture behavior: threshold filtering, truncation and the
//! macro surfaces.

use std::sync::{Arc, Mutex};

use serial_test::serial;
use vigil::record::TRUNCATED_MARKER;
use vigil::test_utils::CollectorSink;
use vigil::{
    config, info, initialize_logging, levels, log_every_n, log_if, logf, vlog, warning,
    LogRecord, LogWorker, SinkHandle,
};

struct Harness {
    _worker: LogWorker,
    records: Arc<Mutex<Vec<LogRecord>>>,
    handle: SinkHandle<CollectorSink>,
}

impl Harness {
    fn start() -> Self {
        let worker = LogWorker::new();
        let (sink, records) = CollectorSink::new();
        let handle = worker.add_sink(sink);
        initialize_logging(&worker);
        Self {
            _worker: worker,
            records,
            handle,
        }
    }

    fn bodies(&self) -> Vec<String> {
        self.handle.call(|_| ()).wait().unwrap();
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.message().to_owned())
            .collect()
    }
}

#[test]
#[serial]
fn records_below_the_threshold_never_reach_a_sink() {
    let harness = Harness::start();
    config::set_min_log_level(400);

    assert!(!vigil::log_enabled(levels::INFO));
    info!("filtered out");
    warning!("kept");

    let bodies = harness.bodies();
    config::set_min_log_level(0);
    assert_eq!(bodies, ["kept"]);
}

#[test]
#[serial]
fn printf_overflow_truncates_with_the_marker() {
    let harness = Harness::start();
    let oversized = "x".repeat(4096);
    logf!(levels::INFO, "{}", oversized);

    let bodies = harness.bodies();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].len() <= 2048);
    assert!(bodies[0].ends_with(TRUNCATED_MARKER));
}

#[test]
#[serial]
fn printf_body_renders_all_arguments() {
    let harness = Harness::start();
    logf!(levels::INFO, "{}-{}", "x", 7);

    let bodies = harness.bodies();
    assert_eq!(bodies, ["x-7"]);
}

#[test]
#[serial]
fn streamed_records_render_site_metadata() {
    let harness = Harness::start();
    info!("streamed {}", 1);

    harness.handle.call(|_| ()).wait().unwrap();
    let records = harness.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message(), "streamed 1");
    assert!(records[0].file.ends_with("capture_tests.rs"));
    assert!(records[0].line > 0);
    assert!(records[0].function.contains("streamed_records_render_site_metadata"));
}

#[test]
#[serial]
fn every_n_samples_the_call_site() {
    let harness = Harness::start();
    for _ in 0..10 {
        log_every_n!(levels::INFO, 3, "sampled");
    }

    assert_eq!(harness.bodies().len(), 4);
}

#[test]
#[serial]
fn conditional_and_verbose_logs() {
    let harness = Harness::start();
    log_if!(levels::INFO, false, "suppressed");
    log_if!(levels::INFO, true, "condition held");

    for i in 0..4 {
        vigil::log_if_every_n!(levels::INFO, i % 2 == 0, 2, "sampled conditional");
    }

    config::set_verbosity(1);
    vlog!(1, "verbose enough");
    vlog!(2, "too verbose");
    config::set_verbosity(0);

    assert_eq!(
        harness.bodies(),
        ["condition held", "sampled conditional", "verbose enough"]
    );
}

#[test]
#[serial]
fn stderr_routing_replaces_or_mirrors_the_sinks() {
    let harness = Harness::start();

    config::set_log_to_stderr(true);
    info!("stderr only");
    harness.handle.call(|_| ()).wait().unwrap();
    config::set_log_to_stderr(false);

    config::set_also_log_to_stderr(true);
    info!("mirrored");
    harness.handle.call(|_| ()).wait().unwrap();
    config::set_also_log_to_stderr(false);

    assert_eq!(harness.bodies(), ["mirrored"]);
}
