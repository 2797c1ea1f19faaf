//! Deterministic JSONL trace lines, gated behind the `telemetry` feature.
//!
//! Lines are built with manual string formatting rather than
//! `serde_json::Value`, because a `Value`-based map has no stable key
//! order and would make two runs of the same query emit byte-different
//! trace lines. Every field here is written in a fixed order instead.
//! Disabled builds compile these calls away entirely rather than
//! formatting and discarding the string.

use std::io::Write;

use crate::ident::NodeId;
use crate::tick::Tick;

/// Escapes the minimal set of characters JSON requires inside a string
/// literal. Field values in this module are all either numeric or
/// produced internally (node ids, reason codes), so this does not need
/// to handle arbitrary user text.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Emits a single query-lifecycle trace line: query start/end with
/// outcome and timing.
#[cfg(feature = "telemetry")]
pub fn trace_query(source: NodeId, goal: NodeId, departure_tick: Tick, outcome: &str, settled: u64) {
    let line = format!(
        "{{\"event\":\"query\",\"source\":{},\"goal\":{},\"departure_tick\":{},\"outcome\":\"{}\",\"settled\":{}}}",
        source.0,
        goal.0,
        departure_tick,
        escape(outcome),
        settled
    );
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{line}");
}

/// Emits a single budget-trip trace line.
#[cfg(feature = "telemetry")]
pub fn trace_budget_trip(reason_code: &str, limit: u64) {
    let line = format!(
        "{{\"event\":\"budget-trip\",\"reason_code\":\"{}\",\"limit\":{}}}",
        escape(reason_code),
        limit
    );
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{line}");
}

/// Emits a single overlay-maintenance trace line (sweep or batch apply).
#[cfg(feature = "telemetry")]
pub fn trace_overlay_maintenance(op: &str, accepted: usize, rejected: usize, remaining: usize) {
    let line = format!(
        "{{\"event\":\"overlay-maintenance\",\"op\":\"{}\",\"accepted\":{},\"rejected\":{},\"remaining\":{}}}",
        escape(op),
        accepted,
        rejected,
        remaining
    );
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{line}");
}

#[cfg(all(test, feature = "telemetry"))]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn escape_handles_quotes_and_backslashes() {
        assert_eq!(escape("a\"b\\c"), "a\\\"b\\\\c");
    }
}
