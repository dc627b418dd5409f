//! The fatal pipeline: pre-fatal hook, recursion guard, swappable dispatch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::crash_handler;
use crate::dispatch;
use crate::levels;
use crate::record::LogRecord;

/// A record routed through the fatal pipeline, plus the originating signal.
/// `signal_id` is 0 for broken contracts and `fatal!`-level records; signal
/// handlers forward the real signal number.
#[derive(Debug, Clone)]
pub struct FatalRecord {
    pub record: LogRecord,
    pub signal_id: i32,
}

impl FatalRecord {
    pub fn reason(&self) -> String {
        crash_handler::signal_name(self.signal_id)
    }
}

/// Panic payload used by test-mode fatal dispatches to unwind out of the
/// capture site instead of terminating the process.
pub struct FatalUnwind(pub FatalRecord);

type PreFatalHook = Arc<dyn Fn() + Send + Sync>;
type FatalDispatch = Arc<dyn Fn(FatalRecord) + Send + Sync>;

static PRE_FATAL_HOOK: Mutex<Option<PreFatalHook>> = Mutex::new(None);
static FATAL_DISPATCH: Mutex<Option<FatalDispatch>> = Mutex::new(None);
static RECURSIVE_FATAL: AtomicUsize = AtomicUsize::new(0);
static FIRST_STACK_TRACE: OnceLock<String> = OnceLock::new();

/// Install an extra step that runs on the producer thread just before the
/// fatal record is dispatched — a debugger trap, typically. The hook is
/// reset to a no-op by `initialize_logging`.
pub fn set_fatal_pre_logging_hook(hook: impl Fn() + Send + Sync + 'static) {
    *PRE_FATAL_HOOK.lock().unwrap() = Some(Arc::new(hook));
}

/// Replace the fatal dispatch. The default queues the terminal task and
/// parks the caller; tests install a dispatch that records the fatal or
/// unwinds instead.
pub fn set_fatal_exit_handler(dispatch: impl Fn(FatalRecord) + Send + Sync + 'static) {
    *FATAL_DISPATCH.lock().unwrap() = Some(Arc::new(dispatch));
}

/// Restore the default terminating dispatch.
pub fn clear_fatal_exit_handler() {
    *FATAL_DISPATCH.lock().unwrap() = None;
}

pub(crate) fn reset_for_initialization() {
    *PRE_FATAL_HOOK.lock().unwrap() = None;
    RECURSIVE_FATAL.store(0, Ordering::SeqCst);
}

pub(crate) fn should_block_for_fatal_handling() -> bool {
    true
}

/// Steps 2–4 of the fatal pipeline, on the producer thread.
pub(crate) fn handle_fatal(mut record: LogRecord, signal_id: i32, stack_trace: Option<String>) {
    // Disarm the hook before invoking it so it cannot re-enter itself, then
    // count this crash. Nested fatals see an armed counter and a no-op hook.
    let hook = PRE_FATAL_HOOK.lock().unwrap().take();
    RECURSIVE_FATAL.fetch_add(1, Ordering::SeqCst);

    let trace = stack_trace.unwrap_or_else(|| {
        if record.level == levels::CONTRACT {
            String::new()
        } else {
            crash_handler::stack_trace()
        }
    });
    // one-shot: with two threads crashing at once either trace may win, and
    // both outcomes are acceptable
    let first_trace = FIRST_STACK_TRACE.get_or_init(|| trace.clone());

    if let Some(hook) = hook {
        hook();
    }

    record.write().push_str(&trace);
    if RECURSIVE_FATAL.load(Ordering::SeqCst) > 1 {
        let body = record.write();
        body.push_str(
            "\n\n\nWARNING\nA recursive fatal event was detected. It is likely that the hook \
             installed with set_fatal_pre_logging_hook is responsible\n\n",
        );
        body.push_str("---First fatal stack trace: ");
        body.push_str(first_trace);
        body.push_str("\n---End of first fatal stack trace\n");
    }

    fatal_call(FatalRecord { record, signal_id });
}

fn fatal_call(fatal: FatalRecord) {
    // clone the handler out so user code never runs under the slot's lock
    let handler = FATAL_DISPATCH.lock().unwrap().clone();
    match handler {
        Some(handler) => handler(fatal),
        None => dispatch::push_fatal(fatal),
    }
}
