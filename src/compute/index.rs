//! index.rs
//! Immutable per-curve offset bookkeeping derived from a validated curve graph.
//!
//! Raw ("dirty") vectors follow one layout convention: the blocks of the in-graph
//! underlyings come first, contiguous and in declared order, each as long as that
//! underlying's full parameter count; the curve's own parameters follow.
//! Exogenous underlyings take no block and their parameters count as the curve's own.

use crate::analysis::topology;
use crate::config::EngineConfig;
use crate::store::{CurveGraph, CurveId};
use crate::validation::{GraphError, Validator};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

/// Where one in-graph underlying sits inside a dependent curve's dirty vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnderlyingBlock {
    pub curve: CurveId,
    pub start: usize,
    pub len: usize,
}

impl UnderlyingBlock {
    pub fn range(&self) -> Range<usize> { self.start..self.start + self.len }
}

/// A block of some dependent's dirty space that belongs to this curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub from: CurveId,
    pub start: usize,
    pub len: usize,
}

impl Route {
    pub fn range(&self) -> Range<usize> { self.start..self.start + self.len }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveIndexEntry {
    pub id: CurveId,
    pub name: String,
    pub parameter_count: usize,
    pub own_parameter_count: usize,
    pub own_block_start: usize,
    /// In declared order.
    pub underlying_blocks: SmallVec<[UnderlyingBlock; 4]>,
    /// Blocks routed to this curve from its dependents, by dependent id.
    pub incoming: SmallVec<[Route; 4]>,
}

impl CurveIndexEntry {
    pub fn own_range(&self) -> Range<usize> {
        self.own_block_start..self.own_block_start + self.own_parameter_count
    }

    pub fn block_for(&self, underlying: CurveId) -> Option<&UnderlyingBlock> {
        self.underlying_blocks.iter().find(|b| b.curve == underlying)
    }
}

/// Offsets, own-parameter counts and fold schedule for every curve of one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveIndex {
    entries: Vec<CurveIndexEntry>,
    by_name: HashMap<String, CurveId>,
    order: Vec<CurveId>,
    levels: Vec<Vec<CurveId>>,
}

impl CurveIndex {
    /// Validates the graph structure, then derives every entry.
    pub fn build(graph: &CurveGraph, config: &EngineConfig) -> Result<Self, GraphError> {
        let order = Validator::new(graph).validate_structure()?;

        // Each entry only reads the graph, so curves are indexed independently.
        let ids: Vec<CurveId> = graph.ids().collect();
        let mut entries: Vec<CurveIndexEntry> = if config.use_parallel(ids.len()) {
            ids.par_iter().map(|&id| index_curve(graph, id)).collect()
        } else {
            ids.iter().map(|&id| index_curve(graph, id)).collect()
        };

        // Invert the blocks into incoming routes. Walking dependents by id keeps
        // the later summation order fixed.
        for d in 0..entries.len() {
            let from = entries[d].id;
            let blocks = entries[d].underlying_blocks.clone();
            for block in blocks {
                entries[block.curve.index()].incoming.push(Route { from, start: block.start, len: block.len });
            }
        }

        let levels = topology::fold_levels(graph, &order);
        debug!(curves = entries.len(), levels = levels.len(), "curve index built");

        Ok(Self {
            by_name: entries.iter().map(|e| (e.name.clone(), e.id)).collect(),
            entries,
            order,
            levels,
        })
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, name: &str) -> Option<&CurveIndexEntry> {
        self.by_name.get(name).map(|id| &self.entries[id.index()])
    }

    #[inline(always)]
    pub fn entry(&self, id: CurveId) -> &CurveIndexEntry { &self.entries[id.index()] }
    pub fn entries(&self) -> &[CurveIndexEntry] { &self.entries }

    /// `(start, length)` of `underlying`'s block inside `curve`'s dirty vector.
    pub fn underlying_block(&self, curve: &str, underlying: &str) -> Option<(usize, usize)> {
        let u = *self.by_name.get(underlying)?;
        self.get(curve)?.block_for(u).map(|b| (b.start, b.len))
    }

    /// Topological order, underlyings first.
    pub fn order(&self) -> &[CurveId] { &self.order }

    /// Dependents-first levels; see [`topology::fold_levels`].
    pub fn levels(&self) -> &[Vec<CurveId>] { &self.levels }

    pub fn total_parameters(&self) -> usize {
        self.entries.iter().fold(0usize, |acc, e| acc.saturating_add(e.parameter_count))
    }

    pub fn total_own_parameters(&self) -> usize {
        self.entries.iter().fold(0usize, |acc, e| acc.saturating_add(e.own_parameter_count))
    }
}

fn index_curve(graph: &CurveGraph, id: CurveId) -> CurveIndexEntry {
    let mut underlying_blocks = SmallVec::new();
    let mut offset = 0;
    for &u in graph.underlyings(id) {
        let len = graph.parameter_count(u);
        underlying_blocks.push(UnderlyingBlock { curve: u, start: offset, len });
        offset = offset.saturating_add(len);
    }

    let parameter_count = graph.parameter_count(id);
    CurveIndexEntry {
        id,
        name: graph.name(id).to_string(),
        parameter_count,
        // Validation guarantees parameter_count >= offset.
        own_parameter_count: parameter_count.saturating_sub(offset),
        own_block_start: offset,
        underlying_blocks,
        incoming: SmallVec::new(),
    }
}
