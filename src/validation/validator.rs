//! The central validator that orchestrates the execution of all validation rules.
use super::error::GraphError;
use super::rules::{membership, parameters, underlyings};
use crate::analysis::topology;
use crate::store::{CurveGraph, CurveId};

/// The gatekeeper run before any sensitivity arithmetic.
///
/// `validate` stops at the first problem, since a single structural defect is
/// enough to make every downstream number untrustworthy. `diagnose` walks the
/// whole graph like a linter and reports everything it finds.
pub struct Validator<'a> {
    graph: &'a CurveGraph,
}

impl<'a> Validator<'a> {
    /// Creates a new validator for the given curve graph.
    pub fn new(graph: &'a CurveGraph) -> Self {
        Self { graph }
    }

    /// Checks the requested names, then the graph structure.
    pub fn validate<S: AsRef<str>>(&self, requested: &[S]) -> Result<(), GraphError> {
        self.validate_requested(requested)?;
        self.validate_structure().map(|_| ())
    }

    /// Checks only that every requested name belongs to the graph.
    pub fn validate_requested<S: AsRef<str>>(&self, requested: &[S]) -> Result<(), GraphError> {
        match membership::validate_requested(self.graph, requested).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Checks acyclicity, duplicate underlyings and parameter counts.
    ///
    /// # Returns
    /// The topological order (underlyings first) on success, so callers do not sort twice.
    pub fn validate_structure(&self) -> Result<Vec<CurveId>, GraphError> {
        let order = topology::sort(self.graph)?;

        for id in self.graph.ids() {
            if let Some(err) = underlyings::validate_unique_underlyings(self.graph, id) {
                return Err(err);
            }
        }
        for id in self.graph.ids() {
            if let Some(err) = parameters::validate_parameter_count(self.graph, id) {
                return Err(err);
            }
        }
        Ok(order)
    }

    /// Collects every violation instead of stopping at the first one.
    pub fn diagnose<S: AsRef<str>>(&self, requested: &[S]) -> Vec<GraphError> {
        let mut errors = membership::validate_requested(self.graph, requested);

        if let Err(err) = topology::sort(self.graph) {
            errors.push(err);
        }

        // Both rules are local to a curve and its direct underlyings, so they
        // remain meaningful even when the graph is cyclic.
        for id in self.graph.ids() {
            if let Some(err) = underlyings::validate_unique_underlyings(self.graph, id) {
                errors.push(err);
            }
            if let Some(err) = parameters::validate_parameter_count(self.graph, id) {
                errors.push(err);
            }
        }
        errors
    }
}
