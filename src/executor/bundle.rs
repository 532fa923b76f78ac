//! Bundle scheduling
//!
//! Runs a whole bundle: `setup_once`, every spec under the serial or parallel
//! discipline, `teardown_once`, then the aggregate verdict. Spec reports are
//! flushed one block at a time in registration order.

use chrono::Utc;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::parallel::{ParallelExecutor, SpecJob};
use super::runner::panic_message;
use crate::context::with_usage_sink;
use crate::error::{EngineError, Result};
use crate::models::{Bundle, BundleSummary, OnceFn, SpecResult};
use crate::output::{ReportFormatter, ReportSink, StderrSink};
use crate::utils::Timer;

/// Scheduler for bundle runs
pub struct BundleScheduler {
    sink: Arc<dyn ReportSink>,
    formatter: ReportFormatter,
}

impl Default for BundleScheduler {
    fn default() -> Self {
        Self::new(Arc::new(StderrSink))
    }
}

impl BundleScheduler {
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self {
            sink,
            formatter: ReportFormatter::new(),
        }
    }

    pub fn with_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Run every spec of `bundle` and report as they are finalized.
    pub async fn run(&self, bundle: &Bundle) -> Result<BundleSummary> {
        let config = bundle.config();
        let started_at = Utc::now();
        let timer = Timer::start(bundle.name());

        info!(
            "Starting bundle {} ({} specs, {})",
            bundle.name(),
            bundle.len(),
            if config.parallel { "parallel" } else { "serial" }
        );
        self.sink
            .emit(&self.formatter.format_bundle_header(bundle.name(), config.parallel));

        run_once_hook(config.setup_once.as_ref(), "setup_once", self.sink.clone()).await;

        let results = if config.parallel {
            self.run_parallel(bundle).await?
        } else {
            self.run_serial(bundle).await
        };

        run_once_hook(
            config.teardown_once.as_ref(),
            "teardown_once",
            self.sink.clone(),
        )
        .await;

        let summary = BundleSummary::new(
            bundle.name(),
            config.parallel,
            started_at,
            timer.stop(),
            results,
        );
        self.sink.emit(&self.formatter.format_bundle_footer(&summary));

        info!(
            "Bundle {} completed in {:.4} s - Pass: {}/{}",
            summary.bundle,
            summary.duration.as_secs_f64(),
            summary.passed,
            summary.total
        );

        Ok(summary)
    }

    fn job(bundle: &Bundle, index: usize, parallel: bool) -> SpecJob {
        let spec = bundle.specs()[index].clone();
        SpecJob {
            hooks: bundle.config().hooks_for(&spec),
            spec,
            parallel,
        }
    }

    fn flush(&self, result: &SpecResult) {
        self.sink.emit(&self.formatter.format_spec(result));
    }

    /// One spec at a time, each flushed before the next starts.
    async fn run_serial(&self, bundle: &Bundle) -> Vec<SpecResult> {
        let mut results = Vec::with_capacity(bundle.len());

        for index in 0..bundle.len() {
            let result = Self::job(bundle, index, false).run_blocking().await;
            self.flush(&result);
            results.push(result);
        }

        results
    }

    /// Forced-serial specs first, then everything else at once; reports go
    /// out in registration order after all specs finished.
    async fn run_parallel(&self, bundle: &Bundle) -> Result<Vec<SpecResult>> {
        let mut slots: Vec<Option<SpecResult>> = vec![None; bundle.len()];
        let (serial, concurrent): (Vec<usize>, Vec<usize>) =
            (0..bundle.len()).partition(|&i| bundle.specs()[i].options().force_serial);

        for index in serial {
            debug!("Running {} serially", bundle.specs()[index]);
            slots[index] = Some(Self::job(bundle, index, false).run_blocking().await);
        }

        let jobs = concurrent
            .iter()
            .map(|&index| Self::job(bundle, index, true))
            .collect();
        let executor = ParallelExecutor::new(bundle.config().max_concurrent);
        for (index, result) in concurrent.into_iter().zip(executor.run_all(jobs).await?) {
            slots[index] = Some(result);
        }

        let results = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    EngineError::Scheduler(format!(
                        "no result for {}",
                        bundle.specs()[index].name()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for result in &results {
            self.flush(result);
        }

        Ok(results)
    }
}

/// Run a once-hook on a blocking thread with no spec bound. Usage errors it
/// triggers go to `sink`.
async fn run_once_hook(hook: Option<&OnceFn>, stage: &'static str, sink: Arc<dyn ReportSink>) {
    let Some(hook) = hook.cloned() else {
        return;
    };

    debug!("Running {}", stage);
    let joined = tokio::task::spawn_blocking(move || {
        with_usage_sink(sink, || panic::catch_unwind(AssertUnwindSafe(|| hook())))
    })
    .await;

    match joined {
        Ok(Ok(())) => {}
        Ok(Err(payload)) => error!("{} panicked: {}", stage, panic_message(payload.as_ref())),
        Err(e) => error!("{} could not be joined: {}", stage, e),
    }
}

/// Run `bundle`, reporting to stderr, and return the number of failed specs.
pub async fn run_bundle(bundle: &Bundle) -> Result<usize> {
    let summary = BundleScheduler::default().run(bundle).await?;
    Ok(summary.failure_count())
}

/// [`run_bundle`] for callers without a tokio runtime.
///
/// Fails with [`EngineError::Scheduler`] when called from inside one; use
/// [`run_bundle`] there.
pub fn run_bundle_blocking(bundle: &Bundle) -> Result<usize> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(EngineError::Scheduler(
            "run_bundle_blocking called from within a tokio runtime".to_string(),
        ));
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| EngineError::Scheduler(format!("failed to start runtime: {e}")))?;
    runtime.block_on(run_bundle(bundle))
}
