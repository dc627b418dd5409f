//! Process-wide options, seeded from the environment at initialization.
//!
//! Routing semantics: `log_to_stderr` replaces the registered sinks with
//! stderr, `also_log_to_stderr` mirrors to stderr in addition, and any record
//! at or above `stderr_threshold` is mirrored regardless.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Once;

use crate::levels;

static LOG_TO_STDERR: AtomicBool = AtomicBool::new(false);
static ALSO_LOG_TO_STDERR: AtomicBool = AtomicBool::new(false);
static MIN_LOG_LEVEL: AtomicI32 = AtomicI32::new(0);
static STDERR_THRESHOLD: AtomicI32 = AtomicI32::new(levels::ERROR.value);
static VERBOSITY: AtomicI32 = AtomicI32::new(0);

static ENV_ONCE: Once = Once::new();

/// Read the `VIGIL_*` environment overrides. Called once from
/// `initialize_logging`; later calls are no-ops.
pub(crate) fn apply_env() {
    ENV_ONCE.call_once(|| {
        if let Some(v) = env_flag("VIGIL_LOGTOSTDERR") {
            LOG_TO_STDERR.store(v, Ordering::Relaxed);
        }
        if let Some(v) = env_flag("VIGIL_ALSOLOGTOSTDERR") {
            ALSO_LOG_TO_STDERR.store(v, Ordering::Relaxed);
        }
        if let Some(v) = env_i32("VIGIL_MINLOGLEVEL") {
            MIN_LOG_LEVEL.store(v, Ordering::Relaxed);
        }
        if let Some(v) = env_i32("VIGIL_STDERRTHRESHOLD") {
            STDERR_THRESHOLD.store(v, Ordering::Relaxed);
        }
        if let Some(v) = env_i32("VIGIL_VERBOSITY") {
            VERBOSITY.store(v, Ordering::Relaxed);
        }
    });
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    Some(matches!(value.as_str(), "1" | "true" | "TRUE" | "yes"))
}

fn env_i32(name: &str) -> Option<i32> {
    std::env::var(name).ok()?.parse().ok()
}

pub fn log_to_stderr() -> bool {
    LOG_TO_STDERR.load(Ordering::Relaxed)
}

pub fn set_log_to_stderr(enabled: bool) {
    LOG_TO_STDERR.store(enabled, Ordering::Relaxed);
}

pub fn also_log_to_stderr() -> bool {
    ALSO_LOG_TO_STDERR.load(Ordering::Relaxed)
}

pub fn set_also_log_to_stderr(enabled: bool) {
    ALSO_LOG_TO_STDERR.store(enabled, Ordering::Relaxed);
}

/// Records with `level.value` below this threshold are dropped at the
/// producer, before any allocation.
pub fn min_log_level() -> i32 {
    MIN_LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn set_min_log_level(value: i32) {
    MIN_LOG_LEVEL.store(value, Ordering::Relaxed);
}

/// Records at or above this level are mirrored to stderr.
pub fn stderr_threshold() -> i32 {
    STDERR_THRESHOLD.load(Ordering::Relaxed)
}

pub fn set_stderr_threshold(value: i32) {
    STDERR_THRESHOLD.store(value, Ordering::Relaxed);
}

/// Ceiling for `vlog!` conditional logs.
pub fn verbosity() -> i32 {
    VERBOSITY.load(Ordering::Relaxed)
}

pub fn set_verbosity(value: i32) {
    VERBOSITY.store(value, Ordering::Relaxed);
}

/// Extra symlink path for the default file sink; empty means none.
pub fn log_link() -> String {
    std::env::var("VIGIL_LOG_LINK").unwrap_or_default()
}

/// Directory for the default file sink: `G3LOG_LOG_DIR`, else `TEST_TMPDIR`,
/// else the current directory ("").
pub fn log_dir() -> String {
    for key in ["G3LOG_LOG_DIR", "TEST_TMPDIR"] {
        if let Ok(value) = std::env::var(key) {
            if !value.is_empty() {
                return value;
            }
        }
    }
    String::new()
}
