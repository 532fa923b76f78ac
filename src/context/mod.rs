//! Per-spec execution context
//!
//! A [`SpecContext`] holds everything one spec invocation owns: the opaque
//! user-data slot, the failure flag, the log buffer and the assertion
//! counters. The runner creates a fresh context for every spec and binds it
//! to the executing thread, so code inside a spec can reach it either through
//! the handle passed to the body or through the [`ambient`] accessors.

pub mod ambient;
mod binding;

use std::any::Any;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::error::{EngineError, Result};
use crate::output::{ReportSink, StderrSink};

pub use binding::ContextGuard;
pub(crate) use binding::with_usage_sink;

/// Indentation used for lines nested under a spec header.
pub(crate) const TAB: &str = "        ";

/// Outcome of a setup, body or teardown callable.
pub type SpecOutcome = std::result::Result<(), Abort>;

/// Early, non-resumable exit from the current spec callable.
///
/// Produced by [`SpecContext::abort`] and friends; the runner catches it at
/// the body boundary and still runs teardown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Abort {
    reason: String,
}

impl Abort {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aborted: {}", self.reason)
    }
}

/// Lifecycle phase of a spec within a bundle run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecPhase {
    Created,
    Setup,
    Body,
    Aborted,
    Completed,
    Teardown,
    Finalized,
}

impl fmt::Display for SpecPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpecPhase::Created => "CREATED",
            SpecPhase::Setup => "SETUP",
            SpecPhase::Body => "BODY",
            SpecPhase::Aborted => "ABORTED",
            SpecPhase::Completed => "COMPLETED",
            SpecPhase::Teardown => "TEARDOWN",
            SpecPhase::Finalized => "FINALIZED",
        };
        f.write_str(s)
    }
}

/// Frozen view of a context taken when the runner finalizes the spec.
#[derive(Clone, Debug)]
pub struct ContextSnapshot {
    pub name: String,
    pub passed_count: usize,
    pub failed_count: usize,
    pub failed: bool,
    pub aborted: bool,
    pub log: String,
}

struct ContextState {
    name: Option<String>,
    user_data: Option<Box<dyn Any + Send>>,
    failed: bool,
    aborted: bool,
    log: String,
    passed_count: usize,
    failed_count: usize,
    phase: SpecPhase,
    sealed: bool,
}

struct Inner {
    parallel: bool,
    state: Mutex<ContextState>,
}

/// Handle to the isolated state of one spec invocation.
///
/// Clones share the same state. A context is never reused across specs.
#[derive(Clone)]
pub struct SpecContext {
    inner: Arc<Inner>,
}

impl SpecContext {
    /// Create a fresh, unbound context.
    ///
    /// `parallel` records whether the spec runs under the parallel discipline.
    pub fn new(parallel: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                parallel,
                state: Mutex::new(ContextState {
                    name: None,
                    user_data: None,
                    failed: false,
                    aborted: false,
                    log: String::new(),
                    passed_count: 0,
                    failed_count: 0,
                    phase: SpecPhase::Created,
                    sealed: false,
                }),
            }),
        }
    }

    // A panicking spec may poison the lock; the state itself stays consistent
    // because every mutation is a single field update.
    fn state(&self) -> MutexGuard<'_, ContextState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bind this context to `name` and to the calling thread.
    ///
    /// The binding lasts until the returned guard is dropped.
    pub fn bind(&self, name: &str) -> Result<ContextGuard> {
        let mut state = self.state();
        if let Some(current) = &state.name {
            return Err(EngineError::AlreadyBound {
                requested: name.to_string(),
                current: current.clone(),
            });
        }
        match binding::install(self.clone()) {
            Ok(guard) => {
                state.name = Some(name.to_string());
                Ok(guard)
            }
            Err(bound) => {
                drop(state);
                Err(EngineError::AlreadyBound {
                    requested: name.to_string(),
                    current: bound.name(),
                })
            }
        }
    }

    /// Name of the spec bound to this context, empty before binding.
    pub fn name(&self) -> String {
        self.state().name.clone().unwrap_or_default()
    }

    pub fn is_parallel(&self) -> bool {
        self.inner.parallel
    }

    pub fn passed_count(&self) -> usize {
        self.state().passed_count
    }

    pub fn failed_count(&self) -> usize {
        self.state().failed_count
    }

    /// Whether an assertion failed or the spec aborted so far.
    pub fn has_failed(&self) -> bool {
        self.state().failed
    }

    pub fn is_aborted(&self) -> bool {
        self.state().aborted
    }

    pub fn phase(&self) -> SpecPhase {
        self.state().phase
    }

    /// Append raw text to the log buffer.
    pub fn append_log(&self, text: &str) {
        if let Some(mut state) = self.unsealed("append_log") {
            state.log.push_str(text);
        }
    }

    /// Append a `[LOG]` line.
    pub fn log(&self, message: impl fmt::Display) {
        self.append_log(&format!("{TAB}[LOG]    {message}\n"));
    }

    /// Append an `[INFO]` line.
    pub fn info(&self, message: impl fmt::Display) {
        self.append_log(&format!("{TAB}[INFO]   {message}\n"));
    }

    /// Count one assertion evaluation. Returns `passed`.
    pub fn record_assertion(&self, passed: bool) -> bool {
        let Some(mut state) = self.unsealed("record_assertion") else {
            return passed;
        };
        if passed {
            state.passed_count += 1;
        } else {
            state.failed_count += 1;
            state.failed = true;
        }
        passed
    }

    /// Record an assertion and log the caller location when it fails.
    #[track_caller]
    pub fn assert(&self, passed: bool, message: impl fmt::Display) -> bool {
        let location = Location::caller();
        if !self.record_assertion(passed) {
            self.append_log(&format!(
                "{TAB}[ERROR]  Assertion Failed in {}:{}\n{TAB}{TAB}{message}\n\n",
                location.file(),
                location.line()
            ));
        }
        passed
    }

    /// Like [`assert`](Self::assert) but aborts the spec when `passed` is false.
    #[track_caller]
    pub fn require(&self, passed: bool, message: impl fmt::Display) -> SpecOutcome {
        let message = message.to_string();
        if self.assert(passed, &message) {
            Ok(())
        } else {
            Err(self.abort_with(message))
        }
    }

    /// Mark the spec failed and produce the abort signal.
    pub fn abort(&self) -> Abort {
        self.abort_with("requested by spec")
    }

    pub fn abort_with(&self, reason: impl Into<String>) -> Abort {
        let reason = reason.into();
        {
            let Some(mut state) = self.unsealed("abort") else {
                return Abort::new(reason);
            };
            state.failed = true;
            state.aborted = true;
        }
        self.append_log(&format!("{TAB}[FAIL]   Aborted: {reason}\n\n"));
        Abort::new(reason)
    }

    /// Clone the user data out of the slot if it holds a `T`.
    pub fn user_data<T: Clone + 'static>(&self) -> Option<T> {
        self.state()
            .user_data
            .as_ref()
            .and_then(|data| data.downcast_ref::<T>())
            .cloned()
    }

    pub fn set_user_data<T: Any + Send>(&self, value: T) {
        if let Some(mut state) = self.unsealed("set_userdata") {
            state.user_data = Some(Box::new(value));
        }
    }

    /// Move the user data out of the slot if it holds a `T`.
    pub fn take_user_data<T: Any + Send>(&self) -> Option<T> {
        let mut state = self.unsealed("take_userdata")?;
        match state.user_data.take()?.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                state.user_data = Some(other);
                None
            }
        }
    }

    fn unsealed(&self, operation: &'static str) -> Option<MutexGuard<'_, ContextState>> {
        let state = self.state();
        if state.sealed {
            drop(state);
            report_usage(&EngineError::Sealed { operation });
            return None;
        }
        Some(state)
    }

    pub(crate) fn enter(&self, phase: SpecPhase) {
        let mut state = self.state();
        trace!(
            spec = state.name.as_deref().unwrap_or(""),
            "{} -> {}",
            state.phase,
            phase
        );
        state.phase = phase;
    }

    /// Freeze counters and log; the context rejects mutation afterwards.
    pub(crate) fn seal(&self) -> ContextSnapshot {
        let mut state = self.state();
        state.sealed = true;
        state.phase = SpecPhase::Finalized;
        ContextSnapshot {
            name: state.name.clone().unwrap_or_default(),
            passed_count: state.passed_count,
            failed_count: state.failed_count,
            failed: state.failed,
            aborted: state.aborted,
            log: state.log.clone(),
        }
    }
}

impl fmt::Debug for SpecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("SpecContext")
            .field("name", &state.name)
            .field("parallel", &self.inner.parallel)
            .field("phase", &state.phase)
            .field("passed_count", &state.passed_count)
            .field("failed_count", &state.failed_count)
            .field("failed", &state.failed)
            .finish()
    }
}

/// Report a usage error on the error stream.
///
/// Goes to the sink installed for the calling thread, stderr otherwise.
pub(crate) fn report_usage(err: &EngineError) {
    debug!("usage error: {}", err);
    let line = format!("[ERROR] Detecting {err}\n");
    match binding::usage_sink() {
        Some(sink) => sink.emit(&line),
        None => StderrSink.emit(&line),
    }
}
