//! Spec and fixture definitions
//!
//! A spec is a named callable plus options; a fixture is a reusable
//! setup/teardown pair that can be attached to several specs.

use std::fmt;
use std::sync::Arc;

use crate::context::{SpecContext, SpecOutcome};

/// Callable run against the context bound to the executing spec.
pub type SpecFn = Arc<dyn Fn(&SpecContext) -> SpecOutcome + Send + Sync>;

/// Callable run once per bundle, outside any spec context.
pub type OnceFn = Arc<dyn Fn() + Send + Sync>;

/// Per-spec execution options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpecOptions {
    pub skip_setup: bool,
    pub skip_teardown: bool,
    /// Run on its own even inside a parallel bundle
    pub force_serial: bool,
}

impl SpecOptions {
    pub const NONE: SpecOptions = SpecOptions {
        skip_setup: false,
        skip_teardown: false,
        force_serial: false,
    };

    pub fn skip_setup(mut self) -> Self {
        self.skip_setup = true;
        self
    }

    pub fn skip_teardown(mut self) -> Self {
        self.skip_teardown = true;
        self
    }

    pub fn serial(mut self) -> Self {
        self.force_serial = true;
        self
    }

    /// Short flag list, e.g. `serial,skip-setup`
    pub fn flags(&self) -> String {
        let mut flags = Vec::new();
        if self.force_serial {
            flags.push("serial");
        }
        if self.skip_setup {
            flags.push("skip-setup");
        }
        if self.skip_teardown {
            flags.push("skip-teardown");
        }
        if flags.is_empty() {
            "none".to_string()
        } else {
            flags.join(",")
        }
    }
}

/// Reusable setup/teardown pair
///
/// Each present hook replaces the bundle's per-spec hook of the same kind for
/// the specs it is attached to.
#[derive(Clone)]
pub struct Fixture {
    name: String,
    setup: Option<SpecFn>,
    teardown: Option<SpecFn>,
}

impl Fixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            setup: None,
            teardown: None,
        }
    }

    pub fn setup<F>(mut self, f: F) -> Self
    where
        F: Fn(&SpecContext) -> SpecOutcome + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(f));
        self
    }

    pub fn teardown<F>(mut self, f: F) -> Self
    where
        F: Fn(&SpecContext) -> SpecOutcome + Send + Sync + 'static,
    {
        self.teardown = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn setup_hook(&self) -> Option<&SpecFn> {
        self.setup.as_ref()
    }

    pub fn teardown_hook(&self) -> Option<&SpecFn> {
        self.teardown.as_ref()
    }
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture")
            .field("name", &self.name)
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .finish()
    }
}

/// A named unit of work
#[derive(Clone)]
pub struct Spec {
    name: String,
    body: SpecFn,
    options: SpecOptions,
    fixture: Option<Fixture>,
}

impl Spec {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&SpecContext) -> SpecOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
            options: SpecOptions::NONE,
            fixture: None,
        }
    }

    pub fn with_options(mut self, options: SpecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixture = Some(fixture);
        self
    }

    pub fn skip_setup(mut self) -> Self {
        self.options = self.options.skip_setup();
        self
    }

    pub fn skip_teardown(mut self) -> Self {
        self.options = self.options.skip_teardown();
        self
    }

    pub fn serial(mut self) -> Self {
        self.options = self.options.serial();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &SpecFn {
        &self.body
    }

    pub fn options(&self) -> SpecOptions {
        self.options
    }

    pub fn fixture(&self) -> Option<&Fixture> {
        self.fixture.as_ref()
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("fixture", &self.fixture)
            .finish()
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SPEC {}", self.name)
    }
}
