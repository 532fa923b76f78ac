//! Bundle definition
//!
//! A bundle is an ordered list of specs plus the hooks shared by all of them.
//! Registration order decides serial execution order and report order.

use std::fmt;
use std::sync::Arc;

use super::spec::{OnceFn, Spec, SpecFn};
use crate::config::EngineConfig;
use crate::context::{SpecContext, SpecOutcome};

/// Hooks and scheduling flags shared by every spec of a bundle
#[derive(Clone, Default)]
pub struct BundleConfig {
    pub parallel: bool,
    /// Upper bound on concurrently running specs; `None` starts all at once
    pub max_concurrent: Option<usize>,
    pub setup_once: Option<OnceFn>,
    pub teardown_once: Option<OnceFn>,
    pub setup: Option<SpecFn>,
    pub teardown: Option<SpecFn>,
}

impl fmt::Debug for BundleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleConfig")
            .field("parallel", &self.parallel)
            .field("max_concurrent", &self.max_concurrent)
            .field("setup_once", &self.setup_once.is_some())
            .field("teardown_once", &self.teardown_once.is_some())
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .finish()
    }
}

/// Setup and teardown in effect for one spec
#[derive(Clone, Default)]
pub struct EffectiveHooks {
    pub setup: Option<SpecFn>,
    pub teardown: Option<SpecFn>,
}

impl BundleConfig {
    /// Resolve hooks for `spec`: fixture hooks win over bundle hooks slot by
    /// slot, and skip options suppress whichever remains.
    pub fn hooks_for(&self, spec: &Spec) -> EffectiveHooks {
        let options = spec.options();
        let fixture = spec.fixture();

        let setup = fixture
            .and_then(|f| f.setup_hook())
            .or(self.setup.as_ref())
            .filter(|_| !options.skip_setup)
            .cloned();
        let teardown = fixture
            .and_then(|f| f.teardown_hook())
            .or(self.teardown.as_ref())
            .filter(|_| !options.skip_teardown)
            .cloned();

        EffectiveHooks { setup, teardown }
    }
}

/// Ordered collection of specs run under one discipline
#[derive(Clone, Debug)]
pub struct Bundle {
    name: String,
    specs: Vec<Spec>,
    config: BundleConfig,
}

impl Bundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specs: Vec::new(),
            config: BundleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BundleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn max_concurrent(mut self, limit: usize) -> Self {
        self.config.max_concurrent = Some(limit);
        self
    }

    pub fn setup_once<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.config.setup_once = Some(Arc::new(f));
        self
    }

    pub fn teardown_once<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.config.teardown_once = Some(Arc::new(f));
        self
    }

    pub fn setup<F>(mut self, f: F) -> Self
    where
        F: Fn(&SpecContext) -> SpecOutcome + Send + Sync + 'static,
    {
        self.config.setup = Some(Arc::new(f));
        self
    }

    pub fn teardown<F>(mut self, f: F) -> Self
    where
        F: Fn(&SpecContext) -> SpecOutcome + Send + Sync + 'static,
    {
        self.config.teardown = Some(Arc::new(f));
        self
    }

    pub fn spec(mut self, spec: Spec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn specs_from(mut self, specs: impl IntoIterator<Item = Spec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Apply engine configuration overrides.
    pub fn apply_config(mut self, config: &EngineConfig) -> Self {
        if config.force_serial {
            self.config.parallel = false;
        }
        if let Some(limit) = config.max_concurrent {
            self.config.max_concurrent = Some(limit);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specs(&self) -> &[Spec] {
        &self.specs
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    pub fn is_parallel(&self) -> bool {
        self.config.parallel
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fixture;

    fn tagged(tag: &'static str) -> impl Fn(&SpecContext) -> SpecOutcome + Send + Sync {
        move |ctx| {
            ctx.log(tag);
            Ok(())
        }
    }

    fn run_hook(hook: &Option<SpecFn>) -> String {
        let ctx = SpecContext::new(false);
        if let Some(hook) = hook {
            let _ = hook(&ctx);
        }
        ctx.seal().log
    }

    #[test]
    fn test_bundle_hooks_apply_without_fixture() {
        let bundle = Bundle::new("b")
            .setup(tagged("bundle-setup"))
            .teardown(tagged("bundle-teardown"));
        let spec = Spec::new("s", |_| Ok(()));

        let hooks = bundle.config().hooks_for(&spec);
        assert!(run_hook(&hooks.setup).contains("bundle-setup"));
        assert!(run_hook(&hooks.teardown).contains("bundle-teardown"));
    }

    #[test]
    fn test_fixture_overrides_slot_by_slot() {
        let bundle = Bundle::new("b")
            .setup(tagged("bundle-setup"))
            .teardown(tagged("bundle-teardown"));
        let spec =
            Spec::new("s", |_| Ok(())).with_fixture(Fixture::new("f").setup(tagged("fixture-setup")));

        let hooks = bundle.config().hooks_for(&spec);
        assert!(run_hook(&hooks.setup).contains("fixture-setup"));
        assert!(run_hook(&hooks.teardown).contains("bundle-teardown"));
    }

    #[test]
    fn test_skip_options_suppress_hooks() {
        let bundle = Bundle::new("b")
            .setup(tagged("bundle-setup"))
            .teardown(tagged("bundle-teardown"));
        let spec = Spec::new("s", |_| Ok(()))
            .with_fixture(Fixture::new("f").setup(tagged("fixture-setup")))
            .skip_setup()
            .skip_teardown();

        let hooks = bundle.config().hooks_for(&spec);
        assert!(hooks.setup.is_none());
        assert!(hooks.teardown.is_none());
    }

    #[test]
    fn test_apply_config_forces_serial() {
        let config = EngineConfig {
            force_serial: true,
            max_concurrent: Some(2),
            ..EngineConfig::default()
        };
        let bundle = Bundle::new("b").parallel(true).apply_config(&config);
        assert!(!bundle.is_parallel());
        assert_eq!(bundle.config().max_concurrent, Some(2));
    }

    #[test]
    fn test_registration_order_kept() {
        let bundle = Bundle::new("b")
            .spec(Spec::new("one", |_| Ok(())))
            .specs_from(vec![Spec::new("two", |_| Ok(())), Spec::new("three", |_| Ok(()))]);
        let names: Vec<_> = bundle.specs().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
        assert_eq!(bundle.len(), 3);
    }
}
