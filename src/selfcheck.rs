//! The engine's own self-check bundle
//!
//! Exercises forced-serial specs inside a parallel bundle, fixtures, skip
//! options, teardown introspection and the ambient accessors. Every spec in it
//! is expected to pass.

use crate::context::{ambient, SpecContext, SpecOutcome};
use crate::models::{Bundle, Fixture, Spec};

/// Build the self-check bundle.
pub fn bundle() -> Bundle {
    let parallel_setup = Fixture::new("parallel_setup").setup(|ctx| {
        ctx.set_user_data(ctx.name());
        Ok(())
    });

    Bundle::new("selfcheck")
        .parallel(true)
        .setup_once(|| {
            // No spec is bound here: this reports a usage error instead.
            ambient::log("this message never reaches a report");
        })
        .setup(|ctx| {
            ctx.assert(true, "setup runs inside the spec context");
            ctx.log("SETUP: this log is probably in parallel.");
            Ok(())
        })
        .teardown(|ctx| {
            if ctx.name() == "serial" {
                ctx.assert(true, "teardown can branch on the spec name");
                ctx.log("Only the serial SPEC gets this line.");
            }
            Ok(())
        })
        .spec(Spec::new("serial", serial).serial().skip_setup())
        .specs_from((1..=3).map(|n| {
            Spec::new(format!("parallel{n}"), parallel_work).with_fixture(parallel_setup.clone())
        }))
}

fn serial(ctx: &SpecContext) -> SpecOutcome {
    ctx.assert(ctx.passed_count() == 0, "no assertions yet");
    ctx.assert(ctx.passed_count() == 1, "one assertion so far");
    ctx.assert(ctx.passed_count() == 2, "two assertions so far");
    ctx.assert(ctx.passed_count() == 3, "three assertions so far");
    ctx.assert(ctx.failed_count() == 0, "nothing failed");
    ctx.assert(!ctx.has_failed(), "spec not failed");
    ctx.assert(ctx.name() == "serial", "name introspection");
    ctx.assert(!ctx.is_parallel(), "forced serial spec");
    Ok(())
}

fn parallel_work(ctx: &SpecContext) -> SpecOutcome {
    ctx.assert(ctx.is_parallel(), "runs under the parallel discipline");
    let name = ambient::user_data::<String>().unwrap_or_default();
    ambient::log(format!("I'm a spec named: {name}"));
    ctx.require(name.starts_with("parallel"), "fixture stored the spec name")?;
    Ok(())
}
