//! Where records are routed: the process-wide logger slot, the
//! first-uninitialized cell and the producer-side submission paths.

use std::sync::{Arc, Mutex, Once, Weak};
use std::time::Duration;

use crate::config;
use crate::crash_handler;
use crate::fatal::{self, FatalRecord};
use crate::levels::{self, Level};
use crate::record::LogRecord;
use crate::worker::{LogWorker, WorkerCore};

enum Slot {
    Uninitialized,
    Initialized(Weak<WorkerCore>),
    ShutDown,
}

static SLOT: Mutex<Slot> = Mutex::new(Slot::Uninitialized);

static INSTALL_ONCE: Once = Once::new();
static FIRST_UNINIT_SET: Once = Once::new();
static FIRST_UNINIT_SAVE: Once = Once::new();
static FIRST_UNINIT: Mutex<Option<LogRecord>> = Mutex::new(None);

/// Link the process-wide logging macros to `worker`.
///
/// Ownership of the worker stays with the caller; the slot only borrows it.
/// Must be called exactly once per live worker — initializing while another
/// worker is active is a configuration error that terminates the process
/// (stderr carries the explanation). A record stashed before initialization
/// is queued before anything else.
pub fn initialize_logging(worker: &LogWorker) {
    INSTALL_ONCE.call_once(crash_handler::install);
    config::apply_env();

    let mut slot = SLOT.lock().unwrap();
    if let Slot::Initialized(active) = &*slot {
        if active.strong_count() > 0 {
            eprintln!(
                "{}->initialize_logging:{}\n\tFatal exit due to illegal double initialization of the log worker\n\tShut the active worker down before installing another one",
                file!(),
                line!()
            );
            std::process::exit(1);
        }
    }

    FIRST_UNINIT_SAVE.call_once(|| {
        if let Some(stashed) = FIRST_UNINIT.lock().unwrap().take() {
            worker.core().save(stashed);
        }
    });

    *slot = Slot::Initialized(Arc::downgrade(worker.core()));
    drop(slot);

    // the pre-fatal hook reverts to a no-op, the recursion counter to zero
    fatal::reset_for_initialization();
}

pub fn is_logging_initialized() -> bool {
    matches!(&*SLOT.lock().unwrap(), Slot::Initialized(active) if active.strong_count() > 0)
}

/// True when a record at `level` would be captured: the level passes the
/// minimum filter and there is either an active worker or room left in the
/// first-uninitialized cell.
pub fn log_enabled(level: Level) -> bool {
    if level.value < config::min_log_level() {
        return false;
    }
    is_logging_initialized() || !FIRST_UNINIT_SET.is_completed()
}

/// Close the process-wide slot. Further submissions are silently dropped;
/// the worker object itself stays with its owner.
pub fn shutdown_logging() {
    *SLOT.lock().unwrap() = Slot::ShutDown;
}

/// Shutdown requested by a specific worker (its destructor). A request from
/// a worker that is not the active one is ignored with a warning.
pub(crate) fn shutdown_for_active_only(core: &Arc<WorkerCore>) -> bool {
    let mut slot = SLOT.lock().unwrap();
    let foreign_worker = match &*slot {
        Slot::Initialized(active) => {
            active.strong_count() > 0 && !Weak::ptr_eq(active, &Arc::downgrade(core))
        }
        // a worker that was never linked has nothing to shut down; the
        // first-uninitialized cell stays armed
        _ => return true,
    };
    if foreign_worker {
        drop(slot);
        eprintln!("vigil: ignored a shutdown request from a log worker that is not the active one");
        crate::warning!(
            "ignored a shutdown request from a log worker that is not the active one; \
             multiple live workers are likely a bug"
        );
        return false;
    }
    *slot = Slot::ShutDown;
    true
}

fn active_worker() -> Option<Arc<WorkerCore>> {
    match &*SLOT.lock().unwrap() {
        Slot::Initialized(active) => active.upgrade(),
        _ => None,
    }
}

/// Entry point for finished captures.
pub(crate) fn submit(record: LogRecord, signal_id: i32, stack_trace: Option<String>) {
    if record.level.value < config::min_log_level() {
        return;
    }
    if levels::is_fatal(record.level) {
        fatal::handle_fatal(record, signal_id, stack_trace);
    } else {
        push_record(record);
    }
}

/// Queue a non-fatal record on the active worker. Before initialization the
/// first record is stashed (and mirrored to stderr); later pre-init records
/// are dropped. After shutdown every record is dropped.
pub(crate) fn push_record(record: LogRecord) {
    match active_worker() {
        Some(core) => core.save(record),
        None => stash_first_uninitialized(record),
    }
}

fn stash_first_uninitialized(record: LogRecord) {
    if !matches!(&*SLOT.lock().unwrap(), Slot::Uninitialized) {
        return;
    }
    // at most one record is ever stashed; the closure (and with it any
    // later record) is simply dropped once the cell is taken
    FIRST_UNINIT_SET.call_once(move || {
        let mut stashed = record;
        let original = std::mem::take(stashed.write());
        let body = stashed.write();
        body.push_str("LOGGER NOT INITIALIZED:\n\t\t");
        body.push_str(&original);
        eprintln!("{stashed}");
        *FIRST_UNINIT.lock().unwrap() = Some(stashed);
    });
}

/// Queue a record and wait until the worker has processed it (and with it,
/// by FIFO order, everything queued earlier).
pub(crate) fn push_record_and_flush(record: LogRecord) -> crate::errors::Result<()> {
    match active_worker() {
        Some(core) => {
            core.save(record);
            core.flush()
        }
        None => Err(crate::errors::Error::NoActiveWorker),
    }
}

/// Default fatal dispatch: queue the terminal task, then park the calling
/// thread until the worker has flushed and terminated the process.
pub(crate) fn push_fatal(fatal: FatalRecord) {
    match active_worker() {
        None => {
            eprintln!(
                "FATAL CALL but the logger is NOT initialized\nCAUSE: {}\nMessage:\n{}",
                fatal.reason(),
                fatal.record
            );
            crash_handler::exit_with_default_signal_handler(fatal.record.level, fatal.signal_id);
        }
        Some(core) => {
            core.fatal(fatal);
            while fatal::should_block_for_fatal_handling() {
                std::thread::sleep(Duration::from_secs(1));
            }
        }
    }
}
