//! Logging macros: the streaming and printf-style surfaces, plus the
//! conditional and sampled variants.

/// Resolves to the enclosing function's path at the call site.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

/// Streaming-style log: formats its arguments into the capture's stream.
#[macro_export]
macro_rules! log {
    ($level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let level = $level;
        if $crate::dispatch::log_enabled(level) {
            let mut capture = $crate::capture::LogCapture::new(
                file!(),
                line!(),
                $crate::function_name!(),
                level,
            );
            let _ = ::std::fmt::Write::write_fmt(
                capture.stream(),
                format_args!($fmt $(, $arg)*),
            );
        }
    }};
}

/// Printf-style log: a formatting failure records the raw format string
/// with a diagnostic suffix instead of losing the record.
#[macro_export]
macro_rules! logf {
    ($level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let level = $level;
        if $crate::dispatch::log_enabled(level) {
            let mut capture = $crate::capture::LogCapture::new(
                file!(),
                line!(),
                $crate::function_name!(),
                level,
            );
            capture.capturef($fmt, format_args!($fmt $(, $arg)*));
        }
    }};
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::log!($crate::levels::DEBUG, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::log!($crate::levels::INFO, $($arg)+) };
}

#[macro_export]
macro_rules! warning {
    ($($arg:tt)+) => { $crate::log!($crate::levels::WARNING, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::log!($crate::levels::ERROR, $($arg)+) };
}

/// Fatal log: flushes every sink, then the process exits through the abort
/// path (unless a test fatal dispatch is installed).
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => { $crate::log!($crate::levels::FATAL, $($arg)+) };
}

/// Log only when `condition` holds.
#[macro_export]
macro_rules! log_if {
    ($level:expr, $condition:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        if $condition {
            $crate::log!($level, $fmt $(, $arg)*);
        }
    };
}

/// Log the 1st, (n+1)th, (2n+1)th... occurrence of this call site.
#[macro_export]
macro_rules! log_every_n {
    ($level:expr, $n:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        static OCCURRENCES: ::std::sync::atomic::AtomicU64 =
            ::std::sync::atomic::AtomicU64::new(0);
        let count = OCCURRENCES.fetch_add(1, ::std::sync::atomic::Ordering::Relaxed);
        if count % ($n as u64) == 0 {
            $crate::log!($level, $fmt $(, $arg)*);
        }
    }};
}

#[macro_export]
macro_rules! log_if_every_n {
    ($level:expr, $condition:expr, $n:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        static OCCURRENCES: ::std::sync::atomic::AtomicU64 =
            ::std::sync::atomic::AtomicU64::new(0);
        if $condition {
            let count = OCCURRENCES.fetch_add(1, ::std::sync::atomic::Ordering::Relaxed);
            if count % ($n as u64) == 0 {
                $crate::log!($level, $fmt $(, $arg)*);
            }
        }
    }};
}

/// Verbose log at `DEBUG`, gated by the process-wide verbosity ceiling.
#[macro_export]
macro_rules! vlog {
    ($verbosity:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        if ($verbosity) <= $crate::config::verbosity() {
            $crate::log!($crate::levels::DEBUG, $fmt $(, $arg)*);
        }
    };
}
