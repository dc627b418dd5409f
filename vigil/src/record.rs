//! The log payload: immutable after submission, cloned once per sink.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::levels::Level;

pub const TRUNCATED_MARKER: &str = "[...truncated...]";

const DEFAULT_MAX_MESSAGE_SIZE: usize = 2048;

static MAX_MESSAGE_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_MESSAGE_SIZE);
static MAX_SIZE_LATCHED: AtomicBool = AtomicBool::new(false);

/// Change the upper bound for a record body.
///
/// Only honored before the first capture; once a record has been bounded the
/// size is latched and later calls are ignored.
pub fn set_max_message_size(max: usize) {
    if !MAX_SIZE_LATCHED.load(Ordering::Acquire) {
        MAX_MESSAGE_SIZE.store(max.max(TRUNCATED_MARKER.len()), Ordering::Release);
    }
}

pub(crate) fn max_message_size() -> usize {
    MAX_SIZE_LATCHED.store(true, Ordering::Release);
    MAX_MESSAGE_SIZE.load(Ordering::Acquire)
}

/// A single log record.
///
/// Built by a capture scope on the producer thread, then owned by the
/// background worker, which may append to the body (stack traces for fatal
/// records) before fanning a clone out to each sink.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub thread_id: u64,
    pub thread_name: Option<String>,
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
    pub level: Level,
    expression: String,
    message: String,
}

impl LogRecord {
    pub fn new(file: &'static str, line: u32, function: &'static str, level: Level) -> Self {
        Self {
            timestamp: Utc::now(),
            thread_id: thread_id::get() as u64,
            thread_name: std::thread::current().name().map(str::to_owned),
            file,
            line,
            function,
            level,
            expression: String::new(),
            message: String::new(),
        }
    }

    /// Mutable access to the body.
    pub fn write(&mut self) -> &mut String {
        &mut self.message
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The predicate text of a broken contract; empty for plain records.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn set_expression(&mut self, expression: &str) {
        self.expression.clear();
        self.expression.push_str(expression);
    }

    pub fn thread_to_string(&self) -> String {
        match &self.thread_name {
            Some(name) => format!("{name}({})", self.thread_id),
            None => self.thread_id.to_string(),
        }
    }

    /// Enforce the configured body bound, keeping the truncation marker as
    /// suffix. Applied when the capture scope finalizes.
    pub(crate) fn bound_message(&mut self) {
        let max = max_message_size();
        if self.message.len() <= max {
            return;
        }
        let mut cut = max - TRUNCATED_MARKER.len();
        while !self.message.is_char_boundary(cut) {
            cut -= 1;
        }
        self.message.truncate(cut);
        self.message.push_str(TRUNCATED_MARKER);
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} {}->{}:{}]",
            self.timestamp.format("%Y/%m/%d %H:%M:%S%.6f"),
            self.level,
            self.file,
            self.function,
            self.line
        )?;
        if self.expression.is_empty() {
            write!(f, " {}", self.message)
        } else {
            write!(f, " CONTRACT BROKEN: [{}] {}", self.expression, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels;

    #[test]
    fn rendering_includes_site_and_microseconds() {
        let mut record = LogRecord::new("src/demo.rs", 12, "demo::run", levels::INFO);
        record.write().push_str("hello");
        let rendered = record.to_string();
        assert!(rendered.contains(" INFO src/demo.rs->demo::run:12] hello"));
        // six-digit zero-padded microsecond fraction inside the timestamp
        let fraction = rendered.split('.').nth(1).unwrap();
        assert_eq!(fraction.chars().take_while(char::is_ascii_digit).count(), 6);
    }

    #[test]
    fn contract_records_render_the_predicate() {
        let mut record = LogRecord::new("a.rs", 1, "f", levels::CONTRACT);
        record.set_expression("x == y");
        record.write().push_str("x == y (1 vs. 2)");
        assert!(record.to_string().contains("CONTRACT BROKEN: [x == y]"));
    }

    #[test]
    fn thread_identifier_is_stringifiable() {
        let record = LogRecord::new("a.rs", 1, "f", levels::INFO);
        assert!(!record.thread_to_string().is_empty());
    }

    #[test]
    fn max_message_size_latches_after_first_read() {
        set_max_message_size(600);
        assert_eq!(max_message_size(), 600);
        // latched now: further mutation is ignored
        set_max_message_size(100);
        assert_eq!(max_message_size(), 600);

        let mut record = LogRecord::new("a.rs", 1, "f", levels::INFO);
        record.write().push_str(&"x".repeat(4096));
        record.bound_message();
        assert_eq!(record.message().len(), 600);
        assert!(record.message().ends_with(TRUNCATED_MARKER));
    }
}
