//! Panic guards for the C ABI.
//!
//! A panic must never unwind into the browser. Every exported function runs
//! its body through [`guard_with_default`], which logs the panic and hands
//! the host a safe fallback value instead.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Text of a panic payload; `panic!` produces either a `&str` or a
/// `String`, anything else is reported by kind only.
pub fn panic_message<'a>(payload: &'a (dyn Any + Send + 'static)) -> &'a str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string payload>")
}

/// Run `f`, returning `default` if it panics.
pub fn guard_with_default<T>(op: &'static str, default: T, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            tracing::error!(op, panic = panic_message(payload.as_ref()), "entry point panicked");
            default
        }
    }
}
