//! Spec result models
//!
//! Defines the per-spec verdict and the bundle-wide summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::context::ContextSnapshot;

/// Final verdict of a spec
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecVerdict {
    Pass,
    Fail,
}

impl SpecVerdict {
    /// A spec passes only with at least one assertion, no failed assertion,
    /// and no abort.
    pub fn decide(passed_count: usize, failed_count: usize, failed: bool) -> Self {
        if passed_count > 0 && failed_count == 0 && !failed {
            SpecVerdict::Pass
        } else {
            SpecVerdict::Fail
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SpecVerdict::Pass)
    }
}

impl fmt::Display for SpecVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecVerdict::Pass => write!(f, "PASS"),
            SpecVerdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Result of a single spec execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpecResult {
    pub name: String,
    pub verdict: SpecVerdict,
    pub passed_count: usize,
    pub failed_count: usize,
    pub aborted: bool,
    pub duration: Duration,
    pub log: String,
}

impl SpecResult {
    pub fn from_snapshot(snapshot: ContextSnapshot, duration: Duration) -> Self {
        Self {
            verdict: SpecVerdict::decide(
                snapshot.passed_count,
                snapshot.failed_count,
                snapshot.failed,
            ),
            name: snapshot.name,
            passed_count: snapshot.passed_count,
            failed_count: snapshot.failed_count,
            aborted: snapshot.aborted,
            duration,
            log: snapshot.log,
        }
    }

    /// Result for a spec the engine could not run to completion.
    pub fn error(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            verdict: SpecVerdict::Fail,
            passed_count: 0,
            failed_count: 0,
            aborted: true,
            duration: Duration::ZERO,
            log: format!("        [ERROR]  {message}\n\n"),
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict.is_success()
    }
}

impl fmt::Display for SpecResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{:.4} s] -> {} fail, {} pass",
            self.verdict,
            self.name,
            self.duration.as_secs_f64(),
            self.failed_count,
            self.passed_count
        )
    }
}

/// Summary of one bundle run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BundleSummary {
    pub bundle: String,
    pub parallel: bool,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
    pub results: Vec<SpecResult>,
}

impl BundleSummary {
    pub fn new(
        bundle: impl Into<String>,
        parallel: bool,
        started_at: DateTime<Utc>,
        duration: Duration,
        results: Vec<SpecResult>,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();

        Self {
            bundle: bundle.into(),
            parallel,
            started_at,
            total,
            passed,
            failed: total - passed,
            duration,
            results,
        }
    }

    /// Number of failed specs; zero means success.
    pub fn failure_count(&self) -> usize {
        self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn result(&self, name: &str) -> Option<&SpecResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Exit status for a process: the failure count, saturated at 255.
    pub fn exit_code(&self) -> i32 {
        self.failed.min(255) as i32
    }
}

impl fmt::Display for BundleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bundle {}", self.bundle)?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        write!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Duration: {:.4} s",
            self.total,
            self.passed,
            self.failed,
            self.duration.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(passed: usize, failed: usize, flag: bool) -> ContextSnapshot {
        ContextSnapshot {
            name: "s".into(),
            passed_count: passed,
            failed_count: failed,
            failed: flag,
            aborted: flag && failed == 0,
            log: String::new(),
        }
    }

    #[test]
    fn test_zero_assertions_fail() {
        assert_eq!(SpecVerdict::decide(0, 0, false), SpecVerdict::Fail);
    }

    #[test]
    fn test_passing_assertions_pass() {
        assert_eq!(SpecVerdict::decide(3, 0, false), SpecVerdict::Pass);
    }

    #[test]
    fn test_any_failure_fails() {
        assert_eq!(SpecVerdict::decide(5, 1, true), SpecVerdict::Fail);
    }

    #[test]
    fn test_abort_fails_despite_passes() {
        let result = SpecResult::from_snapshot(snapshot(1, 0, true), Duration::ZERO);
        assert_eq!(result.verdict, SpecVerdict::Fail);
        assert!(result.aborted);
    }

    #[test]
    fn test_bundle_summary_counts() {
        let results = vec![
            SpecResult::from_snapshot(snapshot(2, 0, false), Duration::from_millis(3)),
            SpecResult::from_snapshot(snapshot(1, 0, true), Duration::from_millis(1)),
            SpecResult::from_snapshot(snapshot(0, 1, true), Duration::from_millis(2)),
        ];

        let summary = BundleSummary::new("b", false, Utc::now(), Duration::from_millis(7), results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failure_count(), 2);
        assert!(!summary.is_success());
        assert_eq!(summary.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_saturates() {
        let results = (0..300)
            .map(|i| SpecResult::error(format!("s{i}"), "boom"))
            .collect();
        let summary = BundleSummary::new("b", true, Utc::now(), Duration::ZERO, results);
        assert_eq!(summary.failure_count(), 300);
        assert_eq!(summary.exit_code(), 255);
    }
}
