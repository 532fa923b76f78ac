//! Spec execution runner
//!
//! Runs one spec against one fresh context: setup, body, teardown, then
//! finalizes the verdict. Aborts and panics stop at this boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::context::{report_usage, SpecContext, SpecOutcome, SpecPhase};
use crate::models::{EffectiveHooks, Spec, SpecFn, SpecResult};
use crate::utils::Timer;

/// Runner for a single spec
#[derive(Clone, Copy, Debug, Default)]
pub struct SpecRunner;

impl SpecRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `spec` to completion on the calling thread.
    ///
    /// `ctx` must be fresh; it is bound to the thread for the duration of the
    /// run and sealed before the result is returned.
    pub fn run(&self, spec: &Spec, ctx: SpecContext, hooks: &EffectiveHooks) -> SpecResult {
        let _guard = match ctx.bind(spec.name()) {
            Ok(guard) => guard,
            Err(err) => {
                report_usage(&err);
                return SpecResult::error(spec.name(), err);
            }
        };

        debug!("Running {}", spec);
        let timer = Timer::start(spec.name());

        let mut aborted = false;
        if let Some(setup) = &hooks.setup {
            ctx.enter(SpecPhase::Setup);
            aborted = invoke(&ctx, setup, "setup").is_err();
        }

        if aborted {
            ctx.info("Skipping body: setup aborted");
        } else {
            ctx.enter(SpecPhase::Body);
            aborted = invoke(&ctx, spec.body(), "body").is_err();
        }
        ctx.enter(if aborted {
            SpecPhase::Aborted
        } else {
            SpecPhase::Completed
        });

        if let Some(teardown) = &hooks.teardown {
            ctx.enter(SpecPhase::Teardown);
            if invoke(&ctx, teardown, "teardown").is_err() {
                warn!("{} aborted during teardown", spec);
            }
        }

        let duration = timer.stop();
        let result = SpecResult::from_snapshot(ctx.seal(), duration);
        debug!("  {}", result);
        result
    }
}

/// Call a spec callable, turning a panic into an abort of the spec.
fn invoke(ctx: &SpecContext, callable: &SpecFn, stage: &str) -> SpecOutcome {
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| callable(ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            return Err(ctx.abort_with(format!("panicked in {stage}: {message}")));
        }
    };

    // An abort signal that did not come from this context still fails the spec.
    if let Err(abort) = &outcome {
        if !ctx.is_aborted() {
            ctx.abort_with(abort.reason());
        }
    }
    outcome
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
