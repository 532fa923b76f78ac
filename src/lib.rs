//! Chlorine - a minimal spec execution engine
//!
//! Specs are registered into bundles and run either one after another or
//! concurrently. Each spec gets its own [`SpecContext`] carrying assertion
//! counts, a failure flag and a buffered log; the log is flushed as one
//! uninterrupted block once the spec has finished.
//!
//! ## Usage
//!
//! ```no_run
//! use chlorine::{run_bundle_blocking, Bundle, Spec};
//!
//! let bundle = Bundle::new("arith").parallel(true).spec(Spec::new("add", |ctx| {
//!     ctx.assert(1 + 1 == 2, "addition");
//!     Ok(())
//! }));
//!
//! let failures = run_bundle_blocking(&bundle).unwrap();
//! std::process::exit(failures.min(255) as i32);
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod models;
pub mod output;
pub mod selfcheck;
pub mod utils;

pub use context::{ambient, Abort, SpecContext, SpecOutcome};
pub use error::{EngineError, Result};
pub use executor::{run_bundle, run_bundle_blocking, BundleScheduler};
pub use models::{Bundle, BundleSummary, Fixture, Spec, SpecOptions, SpecResult};
