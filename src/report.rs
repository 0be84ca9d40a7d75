//! Console table for one operation's results.

use std::fmt::Write;

use crate::error::{BenchError, Result};
use crate::format::{format_bytes, format_period};
use crate::schema::MethodBenchmarkResult;

/// Width every column is right-aligned to.
pub const COLUMN_WIDTH: usize = 15;

/// Renders the header line, the column header and one row per configuration.
pub fn render(result: &MethodBenchmarkResult) -> Result<String> {
    validate(result)?;

    let mut out = String::new();
    let _ = writeln!(out, "Benchmark: {}", result.operation);

    let header = result
        .parameter_names
        .iter()
        .map(String::as_str)
        .chain(["per call", "allocated"]);
    push_row(&mut out, header);

    for m in &result.measurements {
        let summary = m.summary();
        let per_call = format_period(summary.time_per_call_ns);
        let allocated = format_bytes(summary.allocated_per_call);
        let cells = m
            .parameters
            .iter()
            .map(|(_, v)| v.as_str())
            .chain([per_call.as_str(), allocated.as_str()]);
        push_row(&mut out, cells);
    }

    Ok(out)
}

fn validate(result: &MethodBenchmarkResult) -> Result<()> {
    if result.measurements.is_empty() {
        return Err(BenchError::Validation(format!(
            "no measurements for {}",
            result.operation
        )));
    }
    if let Some(stray) = result
        .measurements
        .iter()
        .find(|m| m.operation != result.operation)
    {
        return Err(BenchError::Validation(format!(
            "measurement for {} in report for {}",
            stray.operation, result.operation
        )));
    }
    Ok(())
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for cell in cells {
        let _ = write!(out, "{cell:>width$}", width = COLUMN_WIDTH);
    }
    out.push('\n');
}
