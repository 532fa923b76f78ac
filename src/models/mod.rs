//! Data models for the spec engine
//!
//! Specs, fixtures and bundles going in; results and summaries coming out.

mod bundle;
mod spec;
mod spec_result;

pub use bundle::{Bundle, BundleConfig, EffectiveHooks};
pub use spec::{Fixture, OnceFn, Spec, SpecFn, SpecOptions};
pub use spec_result::{BundleSummary, SpecResult, SpecVerdict};
