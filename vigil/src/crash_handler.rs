//! Crash interception: fatal-signal handlers, the opt-in panic hook and the
//! re-raise exit primitive.
//!
//! `install` hooks the fatal signals so a crashing process still flushes
//! every queued record to every sink before dying with the original signal.
//! Installed once, from `initialize_logging`. Panics unwind by default; an
//! application that wants them treated as fatal events calls
//! [`install_panic_hook`].

use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::io::Write as _;
use std::panic::{self, PanicHookInfo};
use std::sync::Mutex;

use crate::capture::LogCapture;
use crate::dispatch;
use crate::fatal::FatalUnwind;
use crate::levels::{self, Level};

/// Hook the fatal signals into the logging pipeline.
#[cfg(unix)]
pub(crate) fn install() {
    use nix::sys::signal::{self, SigHandler, Signal};

    const FATAL_SIGNALS: [Signal; 5] = [
        Signal::SIGABRT,
        Signal::SIGFPE,
        Signal::SIGILL,
        Signal::SIGSEGV,
        Signal::SIGTERM,
    ];
    for signal in FATAL_SIGNALS {
        unsafe {
            let _ = signal::signal(signal, SigHandler::Handler(fatal_signal_handler));
        }
    }
}

#[cfg(not(unix))]
pub(crate) fn install() {}

/// Runs on the thread the signal was delivered to. The capture routes into
/// the fatal pipeline, which flushes the sinks and re-raises the signal
/// with its default disposition restored.
#[cfg(unix)]
extern "C" fn fatal_signal_handler(signal_id: nix::libc::c_int) {
    let mut capture = LogCapture::from_fatal_signal(
        "signal handler",
        0,
        "fatal_signal_handler",
        levels::FATAL,
        signal_id,
        stack_trace(),
    );
    let _ = write!(
        capture.stream(),
        "received fatal signal {}",
        signal_name(signal_id)
    );
}

/// Treat panics as fatal events: the panic is logged at `FATAL`, queued
/// records are flushed, and with the default fatal dispatch the process
/// exits through the abort path. Opt-in, unlike the signal handlers,
/// because it changes unwinding semantics for the whole process.
pub fn install_panic_hook() {
    type BoxedHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;
    static PREVIOUS_HOOK: Mutex<Option<BoxedHook>> = Mutex::new(None);

    {
        let mut previous = PREVIOUS_HOOK.lock().unwrap();
        if previous.is_none() {
            *previous = Some(panic::take_hook());
        }
    }

    panic::set_hook(Box::new(|panic_info| {
        // the framework's own unwind token must pass through untouched
        if panic_info.payload().downcast_ref::<FatalUnwind>().is_some() {
            return;
        }
        if dispatch::is_logging_initialized() {
            let line = panic_info.location().map_or(0, |location| location.line());
            let mut capture = LogCapture::new("panic", line, "panic hook", levels::FATAL);
            let _ = write!(capture.stream(), "panic: {panic_info}");
            // capture drop enters the fatal pipeline; with the default
            // dispatch this thread never comes back
            drop(capture);
        }
        if let Ok(guard) = PREVIOUS_HOOK.lock() {
            if let Some(hook) = guard.as_ref() {
                hook(panic_info);
            }
        }
    }));
}

/// Best-effort stack trace, usable from a fatal context.
pub fn stack_trace() -> String {
    Backtrace::force_capture().to_string()
}

/// Human-readable reason for a fatal signal id.
pub fn signal_name(signal_id: i32) -> String {
    if signal_id == 0 {
        return String::from("broken contract");
    }
    #[cfg(unix)]
    {
        if let Ok(signal) = nix::sys::signal::Signal::try_from(signal_id) {
            return signal.to_string();
        }
    }
    format!("signal {signal_id}")
}

/// Restore the default disposition for the signal and re-raise it, so the
/// process exits the way the OS would have exited it. Contract breaks
/// (signal 0) and non-Unix targets take the controlled abort path.
pub fn exit_with_default_signal_handler(level: Level, signal_id: i32) -> ! {
    let _ = writeln!(
        std::io::stderr(),
        "exiting after {} event, signal id {signal_id}",
        level.text
    );
    let _ = std::io::stderr().flush();

    #[cfg(unix)]
    {
        use nix::sys::signal::{self, SigHandler, Signal};
        let signal = if signal_id != 0 {
            Signal::try_from(signal_id).ok()
        } else {
            Some(Signal::SIGABRT)
        };
        if let Some(signal_value) = signal {
            unsafe {
                let _ = signal::signal(signal_value, SigHandler::SigDfl);
            }
            if signal_id != 0 {
                let _ = signal::raise(signal_value);
            }
        }
    }

    std::process::abort();
}
