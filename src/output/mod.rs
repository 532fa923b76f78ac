//! Report output
//!
//! Formatting of the report stream and the sinks that receive it.

mod formatter;
mod sink;

pub use formatter::ReportFormatter;
pub use sink::{MemorySink, ReportSink, StderrSink};
