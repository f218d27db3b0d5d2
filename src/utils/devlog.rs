//! Developer bench lines ("level 6") with a per-thread capture buffer.
//!
//! Every CRUD operation emits one JSON line through [`dev6!`](crate::dev6). Lines go to the
//! `restlite::dev6` log target and, when a test enabled it, into a thread-local sink.

use std::cell::RefCell;

pub const DEV_TARGET: &str = "restlite::dev6";

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Turns capture off again when dropped.
pub struct CaptureGuard;

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURE.with(|s| *s.borrow_mut() = None);
    }
}

/// Start capturing dev lines emitted on this thread.
#[must_use = "capture stops when the guard is dropped"]
pub fn enable_thread_sink() -> CaptureGuard {
    CAPTURE.with(|s| *s.borrow_mut() = Some(Vec::new()));
    CaptureGuard
}

pub fn write_str(msg: &str) {
    CAPTURE.with(|s| {
        if let Some(buf) = s.borrow_mut().as_mut() {
            buf.push(msg.to_owned());
        }
    });
}

/// Take everything captured so far on this thread.
pub fn drain() -> Vec<String> {
    CAPTURE.with(|s| s.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

/// Captured bench lines parsed back into JSON; non-JSON lines are skipped.
pub fn drain_bench() -> Vec<serde_json::Value> {
    drain()
        .iter()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .filter(|v| v.get("bench").is_some())
        .collect()
}

/// One bench record for a finished operation.
#[must_use]
pub fn bench_line(op: &str, collection: &str, duration_ms: u64, result_count: u64) -> String {
    serde_json::json!({
        "bench": "crud",
        "op": op,
        "collection": collection,
        "duration_ms": duration_ms,
        "result_count": result_count,
    })
    .to_string()
}

/// Emit a developer line and capture it if the current thread has a sink.
#[macro_export]
macro_rules! dev6 {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        $crate::utils::devlog::write_str(&__s);
        log::log!(target: $crate::utils::devlog::DEV_TARGET, log::Level::Trace, "{}", __s);
    }};
}
