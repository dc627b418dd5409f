//! The default file sink: naming, header, symlink maintenance and the
//! worker-level convenience factory.

use vigil::file_sink::FileSink;
use vigil::test_utils::CollectorSink;
use vigil::{levels, LogRecord, LogWorker, Sink};

fn info_record(body: &str) -> LogRecord {
    let mut record = LogRecord::new(file!(), line!(), "file_sink_tests", levels::INFO);
    record.write().push_str(body);
    record
}

#[test]
fn creates_a_timestamped_file_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new("myapp", dir.path().to_str().unwrap(), "").unwrap();

    let name = sink
        .file_path()
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    let stamp = name
        .strip_prefix("myapp.")
        .unwrap()
        .strip_suffix(".log")
        .unwrap();
    // YYYYMMDD-HHMMSS
    assert_eq!(stamp.len(), 15);
    assert_eq!(stamp.as_bytes()[8], b'-');

    sink.receive(info_record("file sink line"));
    let content = std::fs::read_to_string(sink.file_path()).unwrap();
    assert!(content.contains("vigil created log at:"));
    assert!(content.contains("LOG format:"));
    assert!(content.contains("(uuu*: microseconds fractions of the seconds value)"));
    assert!(content.contains("file sink line"));
}

#[test]
fn logger_id_lands_between_prefix_and_stamp() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileSink::new("myapp", dir.path().to_str().unwrap(), "node7").unwrap();
    let name = sink.file_path().file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("myapp.node7."));
}

#[test]
fn prefix_is_sanitized_before_use() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileSink::new("my app:v1", dir.path().to_str().unwrap(), "").unwrap();
    let name = sink.file_path().file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("myappv1."));

    assert!(FileSink::new("bad{prefix}", dir.path().to_str().unwrap(), "").is_err());
    assert!(FileSink::new("   ", dir.path().to_str().unwrap(), "").is_err());
}

#[cfg(unix)]
#[test]
fn symlink_tracks_the_current_file() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileSink::new("linked", dir.path().to_str().unwrap(), "").unwrap();

    let link = dir.path().join("linked.log");
    let metadata = std::fs::symlink_metadata(&link).unwrap();
    assert!(metadata.file_type().is_symlink());
    let target = std::fs::read_link(&link).unwrap();
    assert_eq!(
        target.as_os_str(),
        sink.file_path().file_name().unwrap()
    );
}

#[test]
fn default_logger_synthesizes_the_conventional_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let worker = LogWorker::new();
    // a second plain sink keeps the registry honest about multiple entries
    let (collector, _records) = CollectorSink::new();
    let _collector_handle = worker.add_sink(collector);

    let handle = worker
        .add_default_logger(
            "/usr/local/bin/demo-service",
            dir.path().to_str().unwrap(),
            "",
        )
        .unwrap();
    let path = handle.call(|sink| sink.file_path().to_path_buf()).wait().unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("demo-service."));
    // prefix carries hostname and username segments before the stamp
    assert!(name.split('.').count() >= 5);
}
