//! Thread-local binding of the active spec context
//!
//! Every spec runs start to finish on one engine-managed blocking thread, so
//! the thread is the unit the ambient accessors resolve against.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use super::SpecContext;
use crate::output::ReportSink;

thread_local! {
    static BOUND: RefCell<Option<SpecContext>> = const { RefCell::new(None) };
    static USAGE_SINK: RefCell<Option<Arc<dyn ReportSink>>> = const { RefCell::new(None) };
}

/// Keeps a context bound to the current thread; unbinds on drop.
///
/// Not `Send`: the binding must be released on the thread that made it.
#[must_use = "the context is unbound as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        BOUND.with(|bound| bound.borrow_mut().take());
    }
}

/// Bind `ctx` to this thread. Fails with the context already bound here.
pub(super) fn install(ctx: SpecContext) -> Result<ContextGuard, SpecContext> {
    BOUND.with(|bound| {
        let mut bound = bound.borrow_mut();
        if let Some(current) = bound.as_ref() {
            return Err(current.clone());
        }
        *bound = Some(ctx);
        Ok(ContextGuard {
            _not_send: PhantomData,
        })
    })
}

/// Context bound to the calling thread, if any.
pub(crate) fn current() -> Option<SpecContext> {
    BOUND.with(|bound| bound.borrow().clone())
}

/// Run `f` with usage errors on this thread going to `sink`.
pub(crate) fn with_usage_sink<R>(sink: Arc<dyn ReportSink>, f: impl FnOnce() -> R) -> R {
    let previous = USAGE_SINK.with(|slot| slot.borrow_mut().replace(sink));
    let result = f();
    USAGE_SINK.with(|slot| *slot.borrow_mut() = previous);
    result
}

/// Sink installed for usage errors on this thread, if any.
pub(crate) fn usage_sink() -> Option<Arc<dyn ReportSink>> {
    USAGE_SINK.with(|slot| slot.borrow().clone())
}
