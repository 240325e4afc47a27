use crate::compute::CurveIndex;
use crate::store::CurveGraph;

/// Shape statistics of one redistribution plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingReport {
    pub curves: usize,
    /// Curves without in-graph underlyings.
    pub leaves: usize,
    /// Underlying blocks routed from a dependent to its underlying.
    pub routed_blocks: usize,
    /// Parameters carried inside routed blocks, counted once per route.
    pub routed_parameters: usize,
    /// Number of dependents-first fold levels.
    pub depth: usize,
    /// Declared underlyings outside the graph.
    pub exogenous_references: usize,
    pub total_parameters: usize,
    pub own_parameters: usize,
    /// Widest fold level; an upper bound on useful parallelism per level.
    pub max_level_width: usize,
}

impl RoutingReport {
    pub fn analyze(graph: &CurveGraph, index: &CurveIndex) -> Self {
        let mut report = Self {
            curves: index.len(),
            depth: index.levels().len(),
            total_parameters: index.total_parameters(),
            own_parameters: index.total_own_parameters(),
            max_level_width: index.levels().iter().map(Vec::len).max().unwrap_or(0),
            ..Default::default()
        };

        for entry in index.entries() {
            if entry.underlying_blocks.is_empty() {
                report.leaves += 1;
            }
            report.routed_blocks += entry.underlying_blocks.len();
            for block in &entry.underlying_blocks {
                report.routed_parameters = report.routed_parameters.saturating_add(block.len);
            }
            report.exogenous_references += graph.exogenous_underlyings(entry.id).count();
        }
        report
    }
}
