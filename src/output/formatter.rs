//! Report formatting
//!
//! Turns finalized results into the plain-text report stream: a bundle
//! header, one block per spec, and a closing verdict.

use crate::context::TAB;
use crate::models::{BundleSummary, SpecResult, SpecVerdict};

const SEPARATOR: &str = "======================================================";

/// Report formatter
#[derive(Clone, Copy, Debug)]
pub struct ReportFormatter {
    timings: bool,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self { timings: true }
    }

    /// Leave elapsed times out so identical bundles give identical reports.
    pub fn without_timings(mut self) -> Self {
        self.timings = false;
        self
    }

    fn secs(&self, secs: f64) -> String {
        if self.timings {
            format!(" in {secs:.4} s")
        } else {
            String::new()
        }
    }

    pub fn format_bundle_header(&self, bundle: &str, parallel: bool) -> String {
        let kind = if parallel { "PARALLEL BUNDLE" } else { "BUNDLE" };
        format!("[INFO] Running {kind}: {bundle}\n\n")
    }

    /// Format one spec: header, accumulated log, verdict, separator.
    pub fn format_spec(&self, result: &SpecResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("[INFO] Executing SPEC => {}\n\n", result.name));
        output.push_str(&result.log);

        let (tag, word) = match result.verdict {
            SpecVerdict::Pass => ("[PASS]", "Passed"),
            SpecVerdict::Fail => ("[FAIL]", "Failed"),
        };
        output.push_str(&format!(
            "{TAB}{tag}   {word} SPEC{} -> {} fail, {} pass\n\n",
            self.secs(result.duration.as_secs_f64()),
            result.failed_count,
            result.passed_count
        ));
        output.push_str(SEPARATOR);
        output.push_str("\n\n");

        output
    }

    pub fn format_bundle_footer(&self, summary: &BundleSummary) -> String {
        let verdict = if summary.is_success() {
            "[SUCCESS]"
        } else {
            "[FAILURE]"
        };
        format!(
            "{verdict} {} SPECS failed, {} SPECS passed{}\n\n",
            summary.failed,
            summary.passed,
            self.secs(summary.duration.as_secs_f64())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn result(name: &str, verdict: SpecVerdict, passed: usize, failed: usize) -> SpecResult {
        SpecResult {
            name: name.to_string(),
            verdict,
            passed_count: passed,
            failed_count: failed,
            aborted: false,
            duration: Duration::from_millis(1500),
            log: format!("{TAB}[LOG]    from {name}\n"),
        }
    }

    #[test]
    fn test_bundle_header() {
        let formatter = ReportFormatter::new();
        assert_eq!(
            formatter.format_bundle_header("tests", true),
            "[INFO] Running PARALLEL BUNDLE: tests\n\n"
        );
        assert_eq!(
            formatter.format_bundle_header("tests", false),
            "[INFO] Running BUNDLE: tests\n\n"
        );
    }

    #[test]
    fn test_spec_block_layout() {
        let block = ReportFormatter::new().format_spec(&result("alpha", SpecVerdict::Pass, 2, 0));
        let lines: Vec<_> = block.lines().filter(|l| !l.is_empty()).collect();

        assert_eq!(lines[0], "[INFO] Executing SPEC => alpha");
        assert!(lines[1].contains("from alpha"));
        assert!(lines[2].contains("[PASS]   Passed SPEC in 1.5000 s -> 0 fail, 2 pass"));
        assert_eq!(lines[3], SEPARATOR);
    }

    #[test]
    fn test_failed_spec_block() {
        let block = ReportFormatter::new()
            .without_timings()
            .format_spec(&result("beta", SpecVerdict::Fail, 1, 1));
        assert!(block.contains("[FAIL]   Failed SPEC -> 1 fail, 1 pass"));
        assert!(!block.contains(" s ->"));
    }

    #[test]
    fn test_footer() {
        let summary = BundleSummary::new(
            "b",
            false,
            Utc::now(),
            Duration::from_millis(250),
            vec![
                result("a", SpecVerdict::Pass, 1, 0),
                result("b", SpecVerdict::Fail, 0, 1),
            ],
        );
        assert_eq!(
            ReportFormatter::new().format_bundle_footer(&summary),
            "[FAILURE] 1 SPECS failed, 1 SPECS passed in 0.2500 s\n\n"
        );
    }
}
