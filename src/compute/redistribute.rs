//! redistribute.rs
//! Turns dirty vectors into clean ones by routing underlying blocks to the curves that own them.
//!
//! Every curve first collects, on top of its own dirty vector, the blocks that its
//! dependents carry for it (the "folded" vector, expressed in its own full parameter
//! space). Its clean vector is the own-parameter slice of that folded vector, and the
//! underlying slices are what it passes further down. A curve is folded only once all
//! of its dependents are, which the index's dependents-first levels guarantee.
//!
//! Each level is evaluated by target curve, pulling from already finalized
//! dependents, so no two tasks ever write to the same vector and the summation
//! order never depends on scheduling.

use super::index::CurveIndex;
use super::kernel;
use super::ledger::{ComputationError, Ledger};
use crate::config::EngineConfig;
use crate::store::{CurveGraph, CurveId};
use rayon::prelude::*;
use tracing::debug;

pub struct Redistributor<'a> {
    graph: &'a CurveGraph,
    index: &'a CurveIndex,
}

impl<'a> Redistributor<'a> {
    pub fn new(graph: &'a CurveGraph, index: &'a CurveIndex) -> Self {
        Self { graph, index }
    }

    pub fn redistribute(&self, dirty: &Ledger, config: &EngineConfig) -> Result<Ledger, ComputationError> {
        // 1. Bounds barrier: the fold below slices without further checks.
        self.validate_dirty_layout(dirty)?;

        // 2. Fold level by level.
        let mut folded = Ledger::with_capacity(self.graph.count());
        for (depth, level) in self.index.levels().iter().enumerate() {
            let computed: Vec<(CurveId, Vec<f64>)> = if config.use_parallel(level.len()) {
                level
                    .par_iter()
                    .map(|&id| self.fold(id, dirty, &folded).map(|v| (id, v)))
                    .collect::<Result<Vec<_>, ComputationError>>()?
            } else {
                level
                    .iter()
                    .map(|&id| self.fold(id, dirty, &folded).map(|v| (id, v)))
                    .collect::<Result<Vec<_>, ComputationError>>()?
            };
            debug!(depth, curves = computed.len(), "fold level committed");
            for (id, vector) in computed {
                folded.insert(id, vector);
            }
        }

        // 3. Keep only the own-parameter slice of every folded vector.
        let mut clean = Ledger::with_capacity(self.graph.count());
        for entry in self.index.entries() {
            let vector = folded.require(self.graph, entry.id)?;
            clean.insert(entry.id, vector[entry.own_range()].to_vec());
        }
        Ok(clean)
    }

    fn fold(&self, id: CurveId, dirty: &Ledger, folded: &Ledger) -> Result<Vec<f64>, ComputationError> {
        let mut vector = dirty.require(self.graph, id)?.to_vec();
        for route in &self.index.entry(id).incoming {
            let source = folded.require(self.graph, route.from)?;
            kernel::add_assign(&mut vector, &source[route.range()]);
        }
        Ok(vector)
    }

    fn validate_dirty_layout(&self, dirty: &Ledger) -> Result<(), ComputationError> {
        for entry in self.index.entries() {
            let vector = dirty.require(self.graph, entry.id)?;
            if vector.len() != entry.parameter_count {
                return Err(ComputationError::DirtyLength {
                    curve: entry.name.clone(),
                    expected: entry.parameter_count,
                    actual: vector.len(),
                });
            }
        }
        Ok(())
    }
}
