//! ledger.rs
//! Dense per-curve vector storage shared by the accumulation and redistribution stages.

use crate::store::{CurveGraph, CurveId};
use crate::validation::GraphError;
use std::fmt;
use thiserror::Error;

/// Which projection of the pricing collaborator produced a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Discounting,
    Forward,
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionKind::Discounting => f.write_str("discounting"),
            ProjectionKind::Forward => f.write_str("forward"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("Projection of {kind} sensitivities onto curve '{curve}' returned {actual} values, expected {expected}")]
    Projection { curve: String, kind: ProjectionKind, expected: usize, actual: usize },
    #[error("Dirty vector for curve '{curve}' has {actual} values, expected {expected}")]
    DirtyLength { curve: String, expected: usize, actual: usize },
    #[error("Sensitivity not conserved: dirty total {dirty_total}, clean total {clean_total}")]
    ConservationViolation { dirty_total: f64, clean_total: f64 },
    #[error("No vector recorded for curve '{0}'")]
    MissingVector(String),
}

/// One optional vector per curve, indexed by `CurveId`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    values: Vec<Option<Vec<f64>>>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(size: usize) -> Self {
        let mut ledger = Self::new();
        ledger.ensure_capacity(size);
        ledger
    }

    pub fn ensure_capacity(&mut self, size: usize) {
        if self.values.len() < size {
            self.values.resize(size, None);
        }
    }

    #[inline(always)]
    pub fn get(&self, curve: CurveId) -> Option<&[f64]> {
        self.values.get(curve.index())?.as_deref()
    }

    /// Like `get`, but a gap is an error naming the curve.
    pub fn require(&self, graph: &CurveGraph, curve: CurveId) -> Result<&[f64], ComputationError> {
        self.get(curve)
            .ok_or_else(|| ComputationError::MissingVector(graph.name(curve).to_string()))
    }

    #[inline(always)]
    pub fn insert(&mut self, curve: CurveId, value: Vec<f64>) {
        let idx = curve.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (CurveId, &[f64])> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_deref().map(|v| (CurveId::new(i), v)))
    }

    /// Plain sum of every stored entry.
    pub fn total(&self) -> f64 {
        self.iter().flat_map(|(_, v)| v.iter()).sum()
    }

    /// Sum of absolute entries; bounds the rounding error of any regrouped sum.
    pub fn absolute_total(&self) -> f64 {
        self.iter().flat_map(|(_, v)| v.iter()).map(|x| x.abs()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_grows_and_get_skips_gaps() {
        let mut ledger = Ledger::new();
        ledger.insert(CurveId::new(2), vec![1.0, 2.0]);

        assert_eq!(ledger.get(CurveId::new(2)), Some(&[1.0, 2.0][..]));
        assert_eq!(ledger.get(CurveId::new(0)), None);
        assert_eq!(ledger.get(CurveId::new(7)), None);
        assert_eq!(ledger.iter().count(), 1);
    }

    #[test]
    fn test_total_sums_all_vectors() {
        let mut ledger = Ledger::with_capacity(2);
        ledger.insert(CurveId::new(0), vec![1.0, 2.0]);
        ledger.insert(CurveId::new(1), vec![0.5]);
        assert_eq!(ledger.total(), 3.5);
    }

    #[test]
    fn test_absolute_total_ignores_sign() {
        let mut ledger = Ledger::new();
        ledger.insert(CurveId::new(0), vec![1e17, -1e17]);
        ledger.insert(CurveId::new(1), vec![-0.5]);
        assert_eq!(ledger.total(), -0.5);
        assert_eq!(ledger.absolute_total(), 2e17);
    }

    #[test]
    fn test_require_names_missing_curve() {
        let graph = CurveGraph::builder().add_curve("OIS", 2, &[]).build().unwrap();
        let ledger = Ledger::new();
        let err = ledger.require(&graph, CurveId::new(0)).unwrap_err();
        assert_eq!(err, ComputationError::MissingVector("OIS".into()));
    }

    #[test]
    fn test_projection_error_message() {
        let err = ComputationError::Projection {
            curve: "USD-OIS".into(),
            kind: ProjectionKind::Forward,
            expected: 5,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "Projection of forward sensitivities onto curve 'USD-OIS' returned 4 values, expected 5"
        );
    }
}
