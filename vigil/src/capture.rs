//! Scoped capture of a record in progress.
//!
//! A `LogCapture` is only constructed once the level passed the enabled
//! check. It accumulates the body through [`LogCapture::stream`] or
//! [`LogCapture::capturef`] and submits the finished record when it goes out
//! of scope — on every exit path, unwinding included.

use std::fmt;

use crate::dispatch;
use crate::levels::Level;
use crate::record::LogRecord;

pub struct LogCapture {
    record: Option<LogRecord>,
    signal_id: i32,
    stack_trace: Option<String>,
}

impl LogCapture {
    pub fn new(file: &'static str, line: u32, function: &'static str, level: Level) -> Self {
        Self {
            record: Some(LogRecord::new(file, line, function, level)),
            signal_id: 0,
            stack_trace: None,
        }
    }

    /// Capture for a broken contract, quoting the predicate text.
    pub fn with_expression(
        file: &'static str,
        line: u32,
        function: &'static str,
        level: Level,
        expression: &str,
    ) -> Self {
        let mut capture = Self::new(file, line, function, level);
        capture.record_mut().set_expression(expression);
        capture
    }

    /// Capture forwarded by an OS-signal handler: carries the originating
    /// signal number and the stack trace collected in the signal context.
    pub fn from_fatal_signal(
        file: &'static str,
        line: u32,
        function: &'static str,
        level: Level,
        signal_id: i32,
        stack_trace: String,
    ) -> Self {
        let mut capture = Self::new(file, line, function, level);
        capture.signal_id = signal_id;
        capture.stack_trace = Some(stack_trace);
        capture
    }

    /// The streaming write target; accepts anything `write!` can format.
    pub fn stream(&mut self) -> &mut String {
        self.record_mut().write()
    }

    /// Formatter-style capture. On a formatting failure the raw format
    /// string is recorded with a diagnostic suffix instead.
    pub fn capturef(&mut self, fmt_str: &str, args: fmt::Arguments<'_>) {
        use fmt::Write as _;
        let start = self.record_mut().message().len();
        if self.record_mut().write().write_fmt(args).is_err() {
            let body = self.record_mut().write();
            body.truncate(start);
            body.push_str(fmt_str);
            body.push_str(" [formatting failed, raw format string shown]");
        }
    }

    fn record_mut(&mut self) -> &mut LogRecord {
        self.record.as_mut().expect("log capture already finalized")
    }
}

impl Drop for LogCapture {
    fn drop(&mut self) {
        if let Some(mut record) = self.record.take() {
            record.bound_message();
            dispatch::submit(record, self.signal_id, self.stack_trace.take());
        }
    }
}
