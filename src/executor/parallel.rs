//! Parallel spec execution
//!
//! Fan-out/fan-in over blocking tasks: every spec gets its own unit of
//! concurrency, results come back in submission order.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

use super::runner::SpecRunner;
use crate::context::SpecContext;
use crate::error::{EngineError, Result};
use crate::models::{EffectiveHooks, Spec, SpecResult};

/// One spec ready to run, with its resolved hooks
#[derive(Clone)]
pub struct SpecJob {
    pub spec: Spec,
    pub hooks: EffectiveHooks,
    /// Whether the spec runs under the parallel discipline
    pub parallel: bool,
}

impl SpecJob {
    /// Run on a dedicated blocking thread with a fresh context.
    pub async fn run_blocking(self) -> SpecResult {
        let name = self.spec.name().to_string();
        let handle = tokio::task::spawn_blocking(move || {
            let ctx = SpecContext::new(self.parallel);
            SpecRunner::new().run(&self.spec, ctx, &self.hooks)
        });

        match handle.await {
            Ok(result) => result,
            Err(err) => SpecResult::error(name, EngineError::from(err)),
        }
    }
}

/// Parallel spec executor
#[derive(Clone, Debug, Default)]
pub struct ParallelExecutor {
    max_concurrent: Option<usize>,
}

impl ParallelExecutor {
    /// `None` starts every spec at once; `Some(n)` keeps at most `n` in flight.
    pub fn new(max_concurrent: Option<usize>) -> Self {
        Self {
            max_concurrent: max_concurrent.map(|n| n.max(1)),
        }
    }

    pub fn max_concurrent(&self) -> Option<usize> {
        self.max_concurrent
    }

    /// Launch all jobs together and wait for every one of them.
    ///
    /// The returned results are in the same order as `jobs`, whatever order
    /// the specs completed in.
    pub async fn run_all(&self, jobs: Vec<SpecJob>) -> Result<Vec<SpecResult>> {
        let semaphore = self.max_concurrent.map(|n| Arc::new(Semaphore::new(n)));
        let names: Vec<String> = jobs.iter().map(|j| j.spec.name().to_string()).collect();

        let mut handles = Vec::with_capacity(jobs.len());
        for job in jobs {
            let semaphore = semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => Some(
                        semaphore
                            .acquire_owned()
                            .await
                            .map_err(|e| EngineError::Scheduler(e.to_string()))?,
                    ),
                    None => None,
                };

                debug!("Starting parallel execution of {}", job.spec);
                Ok::<_, EngineError>(job.run_blocking().await)
            });

            handles.push(handle);
        }

        let mut results = Vec::with_capacity(handles.len());
        for (name, joined) in names.into_iter().zip(join_all(handles).await) {
            let result = match joined {
                Ok(Ok(result)) => result,
                // Misuse stays with the spec; anything else stops the bundle.
                Ok(Err(err)) if err.is_usage() => SpecResult::error(name, err),
                Ok(Err(err)) => return Err(err),
                Err(err) => SpecResult::error(name, EngineError::from(err)),
            };
            results.push(result);
        }

        Ok(results)
    }
}
