//! assemble.rs
//! Concatenates clean vectors in the caller's order and records where each block lands.

use super::ledger::{ComputationError, Ledger};
use crate::store::CurveGraph;
use crate::validation::GraphError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Position of one requested curve inside the assembled vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveBlock {
    pub name: String,
    pub range: Range<usize>,
}

/// The flat output vector together with its per-curve layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    values: Vec<f64>,
    layout: Vec<CurveBlock>,
}

impl SensitivityResult {
    pub fn values(&self) -> &[f64] { &self.values }
    pub fn into_values(self) -> Vec<f64> { self.values }
    pub fn layout(&self) -> &[CurveBlock] { &self.layout }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// The first block requested under `name`.
    pub fn block(&self, name: &str) -> Option<&[f64]> {
        self.layout
            .iter()
            .find(|b| b.name == name)
            .map(|b| &self.values[b.range.clone()])
    }

    pub fn iter_blocks(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.layout.iter().map(|b| (b.name.as_str(), &self.values[b.range.clone()]))
    }
}

/// Builds the output for `requested`, in that order. A name may appear more than once.
pub fn assemble<S: AsRef<str>>(graph: &CurveGraph, clean: &Ledger, requested: &[S]) -> Result<SensitivityResult, ComputationError> {
    let mut blocks = Vec::with_capacity(requested.len());
    for name in requested.iter().map(AsRef::as_ref) {
        let vector = graph
            .id_of(name)
            .and_then(|id| clean.get(id))
            .ok_or_else(|| GraphError::UnknownCurve { name: name.to_string() })?;
        blocks.push((name, vector));
    }

    let total = blocks.iter().map(|(_, v)| v.len()).sum();
    let mut values = Vec::with_capacity(total);
    let mut layout = Vec::with_capacity(blocks.len());
    for (name, vector) in blocks {
        let start = values.len();
        values.extend_from_slice(vector);
        layout.push(CurveBlock { name: name.to_string(), range: start..values.len() });
    }

    Ok(SensitivityResult { values, layout })
}
