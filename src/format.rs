//! Human-readable time and byte quantities.

const BYTE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a per-call period given in nanoseconds, e.g. `2.50ms`, `500.00µs`.
pub fn format_period(ns: f64) -> String {
    if ns >= 1_000_000.0 {
        format!("{:.2}ms", ns / 1_000_000.0)
    } else if ns >= 1_000.0 {
        format!("{:.2}µs", ns / 1_000.0)
    } else {
        format!("{ns:.2}ns")
    }
}

/// Formats a byte count with binary units, e.g. `512 B`, `2 KB`, `1.43 MB`.
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes.max(0.0);
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{value:.0} B")
    } else {
        format!("{} {}", trim_decimals(&format!("{value:.2}")), BYTE_UNITS[unit])
    }
}

fn trim_decimals(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
