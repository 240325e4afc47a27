//! Rule: a curve cannot expose fewer raw parameters than its in-graph underlyings occupy.

use crate::store::{CurveGraph, CurveId};
use crate::validation::error::GraphError;

/// The underlying blocks sit at the front of the curve's raw vector, so their
/// combined length must fit inside `parameter_count`. Equality is allowed and
/// leaves the curve with no parameters of its own.
pub(crate) fn validate_parameter_count(graph: &CurveGraph, curve: CurveId) -> Option<GraphError> {
    let declared = graph.parameter_count(curve);
    let required = graph
        .underlyings(curve)
        .iter()
        .try_fold(0usize, |acc, &u| acc.checked_add(graph.parameter_count(u)));

    match required {
        Some(required) if required <= declared => None,
        // An overflowing total never fits; it is reported as usize::MAX.
        required => Some(GraphError::ParameterCount {
            curve: graph.name(curve).to_string(),
            declared,
            required: required.unwrap_or(usize::MAX),
        }),
    }
}
