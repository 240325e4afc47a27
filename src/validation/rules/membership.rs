//! Rule: every requested curve must be part of the graph.

use crate::store::CurveGraph;
use crate::validation::error::GraphError;

/// Returns one error per requested name missing from the graph, in request order.
pub(crate) fn validate_requested<S: AsRef<str>>(graph: &CurveGraph, requested: &[S]) -> Vec<GraphError> {
    requested
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !graph.contains(name))
        .map(|name| GraphError::UnknownCurve { name: name.to_string() })
        .collect()
}
