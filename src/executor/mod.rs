//! Spec execution engine
//!
//! Provides the single-spec runner and the serial/parallel bundle scheduler.

mod bundle;
mod parallel;
mod runner;

pub use bundle::{run_bundle, run_bundle_blocking, BundleScheduler};
pub use parallel::{ParallelExecutor, SpecJob};
pub use runner::SpecRunner;
