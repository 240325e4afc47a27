//! Defines the error types for the validation module.
use thiserror::Error;

/// Structural problems with a curve graph or with the names requested from it.
///
// Variants carry names rather than `CurveId`s so that messages stay meaningful
// after the graph that produced them is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A requested (or otherwise required) curve is not part of the graph.
    #[error("Unknown curve '{name}'")]
    UnknownCurve { name: String },

    /// The underlying-curve relation is not acyclic. `path` starts and ends on the same curve.
    #[error("Cycle detected in curve dependencies: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// A curve declares fewer parameters than its in-graph underlyings occupy.
    #[error("Curve '{curve}' declares {declared} parameters but its underlyings require {required}")]
    ParameterCount { curve: String, declared: usize, required: usize },

    #[error("Duplicate curve name '{name}'")]
    DuplicateCurve { name: String },

    /// The same in-graph underlying is listed twice, making its block offset ambiguous.
    #[error("Curve '{curve}' lists underlying '{underlying}' more than once")]
    DuplicateUnderlying { curve: String, underlying: String },

    /// A curve was built on a different version of a named underlying than the one
    /// registered under that name, so its block would be misrouted.
    #[error("Curve '{curve}' embeds underlying '{underlying}' with {embedded} parameters, but the registered curve has {registered}")]
    UnderlyingSize { curve: String, underlying: String, registered: usize, embedded: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = GraphError::Cycle { path: vec!["X".into(), "Y".into(), "X".into()] };
        assert_eq!(err.to_string(), "Cycle detected in curve dependencies: X -> Y -> X");
    }

    #[test]
    fn test_parameter_count_message() {
        let err = GraphError::ParameterCount { curve: "B".into(), declared: 3, required: 5 };
        assert_eq!(err.to_string(), "Curve 'B' declares 3 parameters but its underlyings require 5");
    }
}
