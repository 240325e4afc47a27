//! Rule: an in-graph underlying may appear only once in a curve's declaration.

use crate::store::{CurveGraph, CurveId};
use crate::validation::error::GraphError;
use smallvec::SmallVec;

pub(crate) fn validate_unique_underlyings(graph: &CurveGraph, curve: CurveId) -> Option<GraphError> {
    let mut seen: SmallVec<[CurveId; 8]> = SmallVec::new();
    for &underlying in graph.underlyings(curve) {
        if seen.contains(&underlying) {
            return Some(GraphError::DuplicateUnderlying {
                curve: graph.name(curve).to_string(),
                underlying: graph.name(underlying).to_string(),
            });
        }
        seen.push(underlying);
    }
    None
}
