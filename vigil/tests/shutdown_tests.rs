//! Shutdown racing against live producers: any number of records may be
//! lost past the shutdown point, but a delivered record is delivered to
//! every sink.

use std::thread;
use std::time::Duration;

use vigil::test_utils::CollectorSink;
use vigil::{info, initialize_logging, LogWorker};

const PRODUCERS: usize = 4;
const RECORDS_PER_PRODUCER: usize = 50;

#[test]
fn no_partial_fanout_during_shutdown() {
    let worker = LogWorker::new();
    let (first, first_records) = CollectorSink::new();
    let _first_handle = worker.add_sink(first);
    let (second, second_records) = CollectorSink::new();
    let _second_handle = worker.add_sink(second);
    initialize_logging(&worker);

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            thread::spawn(move || {
                for i in 0..RECORDS_PER_PRODUCER {
                    info!("race producer={} record={}", producer, i);
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(2));
    drop(worker);
    for producer in producers {
        producer.join().unwrap();
    }

    let first: Vec<String> = first_records.lock().unwrap().iter().map(|r| r.to_string()).collect();
    let second: Vec<String> = second_records.lock().unwrap().iter().map(|r| r.to_string()).collect();
    assert!(first.len() <= PRODUCERS * RECORDS_PER_PRODUCER);
    assert_eq!(first, second);
}
