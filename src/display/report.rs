use crate::compute::SensitivityResult;
use std::fmt::Write;

const RULE: &str = "--------------------------------------------------";

/// Formats one assembled result as a per-curve breakdown.
///
/// Each block lists its slice of the output vector, its sum and its values.
pub fn format_breakdown(result: &SensitivityResult) -> String {
    let mut out = String::new();
    let blocks = result.layout();

    let _ = writeln!(out, "SENSITIVITY BREAKDOWN ({} curves, {} parameters):", blocks.len(), result.len());
    let _ = writeln!(out, "{}", RULE);

    for (i, (name, values)) in result.iter_blocks().enumerate() {
        let is_last = i + 1 == blocks.len();
        let connector = if is_last { "`-- " } else { "|-- " };
        let stem = if is_last { "    " } else { "|   " };
        let range = &blocks[i].range;
        let total: f64 = values.iter().sum();

        let _ = writeln!(out, "{}{} [{}..{}] total={:.4}", connector, name, range.start, range.end, total);
        if values.is_empty() {
            let _ = writeln!(out, "{}(no own parameters)", stem);
        } else {
            let _ = writeln!(out, "{}{}", stem, format_values(values));
        }
    }

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "TOTAL {:.4}", result.values().iter().sum::<f64>());
    out
}

fn format_values(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.4}", v)).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::assemble::assemble;
    use crate::compute::Ledger;
    use crate::store::{CurveGraph, CurveId};

    #[test]
    fn test_breakdown_lists_blocks_in_request_order() {
        let graph = CurveGraph::builder()
            .add_curve("OIS", 2, &[])
            .add_curve("L3M", 3, &["OIS"])
            .build()
            .unwrap();
        let mut clean = Ledger::new();
        clean.insert(CurveId::new(0), vec![1.0, 2.0]);
        clean.insert(CurveId::new(1), vec![0.5]);
        let result = assemble(&graph, &clean, &["L3M", "OIS"]).unwrap();

        let text = format_breakdown(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SENSITIVITY BREAKDOWN (2 curves, 3 parameters):");
        assert_eq!(lines[2], "|-- L3M [0..1] total=0.5000");
        assert_eq!(lines[3], "|   [0.5000]");
        assert_eq!(lines[4], "`-- OIS [1..3] total=3.0000");
        assert_eq!(lines[5], "    [1.0000, 2.0000]");
        assert_eq!(lines.last(), Some(&"TOTAL 3.5000"));
    }

    #[test]
    fn test_breakdown_of_curve_without_own_parameters() {
        let graph = CurveGraph::builder()
            .add_curve("A", 2, &[])
            .add_curve("B", 2, &["A"])
            .build()
            .unwrap();
        let mut clean = Ledger::new();
        clean.insert(CurveId::new(0), vec![1.0, 1.0]);
        clean.insert(CurveId::new(1), vec![]);
        let result = assemble(&graph, &clean, &["B"]).unwrap();
        assert!(format_breakdown(&result).contains("`-- B [0..0] total=0.0000\n    (no own parameters)"));
    }
}
