//! Ambient accessors for the spec bound to the calling thread
//!
//! These mirror the [`SpecContext`] methods for code that has no handle at
//! hand, such as shared helpers called from several spec bodies. Called with
//! no bound context (from `setup_once`, `teardown_once`, or a thread the
//! engine does not manage) they report a usage error and do nothing.

use std::any::Any;
use std::fmt;

use super::{binding, report_usage, Abort, SpecContext, SpecOutcome};
use crate::error::{EngineError, Result};

/// Resolve the context bound to the calling thread.
pub fn current() -> Result<SpecContext> {
    lookup("current")
}

fn lookup(operation: &'static str) -> Result<SpecContext> {
    binding::current().ok_or(EngineError::NoBoundContext { operation })
}

fn with_bound<R>(operation: &'static str, fallback: R, f: impl FnOnce(&SpecContext) -> R) -> R {
    match lookup(operation) {
        Ok(ctx) => f(&ctx),
        Err(err) => {
            report_usage(&err);
            fallback
        }
    }
}

pub fn name() -> String {
    with_bound("get_name", String::new(), |ctx| ctx.name())
}

pub fn passed_count() -> usize {
    with_bound("num_passed", 0, |ctx| ctx.passed_count())
}

pub fn failed_count() -> usize {
    with_bound("num_failed", 0, |ctx| ctx.failed_count())
}

pub fn has_failed() -> bool {
    with_bound("has_failed", false, |ctx| ctx.has_failed())
}

pub fn is_parallel() -> bool {
    with_bound("is_parallel", false, |ctx| ctx.is_parallel())
}

pub fn log(message: impl fmt::Display) {
    with_bound("log", (), |ctx| ctx.log(message))
}

pub fn record_assertion(passed: bool) -> bool {
    with_bound("record_assertion", passed, |ctx| ctx.record_assertion(passed))
}

#[track_caller]
pub fn assert(passed: bool, message: impl fmt::Display) -> bool {
    match lookup("assert") {
        Ok(ctx) => ctx.assert(passed, message),
        Err(err) => {
            report_usage(&err);
            passed
        }
    }
}

#[track_caller]
pub fn require(passed: bool, message: impl fmt::Display) -> SpecOutcome {
    match lookup("require") {
        Ok(ctx) => ctx.require(passed, message),
        Err(err) => {
            report_usage(&err);
            Ok(())
        }
    }
}

/// Abort the bound spec. Unbound, the returned signal carries no state change.
pub fn abort() -> Abort {
    match lookup("abort") {
        Ok(ctx) => ctx.abort(),
        Err(err) => {
            report_usage(&err);
            Abort::new(err.to_string())
        }
    }
}

pub fn user_data<T: Clone + 'static>() -> Option<T> {
    with_bound("get_userdata", None, |ctx| ctx.user_data::<T>())
}

pub fn set_user_data<T: Any + Send>(value: T) {
    with_bound("set_userdata", (), |ctx| ctx.set_user_data(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use std::sync::Arc;

    #[test]
    fn test_unbound_calls_are_noops() {
        assert!(matches!(
            current(),
            Err(EngineError::NoBoundContext { operation: "current" })
        ));
        assert_eq!(name(), "");
        assert_eq!(passed_count(), 0);
        assert!(!has_failed());
        assert!(!is_parallel());
        assert!(assert(true, "unbound"));
        assert!(require(false, "unbound").is_ok());
        assert_eq!(user_data::<String>(), None);
        set_user_data(7u8);
        log("dropped");
        assert_eq!(abort().reason(), "call to abort() from outside the scope of a SPEC");
    }

    #[test]
    fn test_bound_calls_reach_context() {
        let ctx = SpecContext::new(true);
        let _guard = ctx.bind("ambient").unwrap();

        assert_eq!(name(), "ambient");
        assert!(is_parallel());
        assert!(assert(true, "one"));
        record_assertion(false);
        set_user_data(42u32);
        log("hello");

        assert_eq!(passed_count(), 1);
        assert_eq!(failed_count(), 1);
        assert!(has_failed());
        assert_eq!(user_data::<u32>(), Some(42));
        assert_eq!(ctx.user_data::<u32>(), Some(42));
    }

    #[test]
    fn test_unbound_call_is_reported() {
        let sink = Arc::new(MemorySink::new());
        crate::context::with_usage_sink(sink.clone(), || {
            log("lost");
            let _ = user_data::<u8>();
        });

        assert_eq!(
            sink.text(),
            "[ERROR] Detecting call to log() from outside the scope of a SPEC\n\
             [ERROR] Detecting call to get_userdata() from outside the scope of a SPEC\n"
        );
    }
}
