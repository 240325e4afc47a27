//! registry.rs
//! Immutable curve dependency snapshot: columnar attributes, CSR underlyings, linked-list dependents.

use super::types::{CurveDefinition, CurveId, CurveMetadataProvider};
use crate::validation::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// The closed set of curves taking part in one sensitivity computation.
///
/// Built once through [`CurveGraphBuilder`] and never mutated afterwards, so that
/// validation and every later stage observe the same view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "Vec<CurveDefinition>", try_from = "Vec<CurveDefinition>")]
pub struct CurveGraph {
    // Columnar Arrays
    names: Vec<String>,
    parameter_counts: Vec<usize>,
    declared_underlyings: Vec<Vec<String>>,

    // Topology: in-graph underlyings (CSR, declared order)
    underlyings_flat: Vec<CurveId>,
    underlying_ranges: Vec<(u32, u32)>, // (start, count)

    // Dependents (adjacency list, newest edge first)
    first_dependent: Vec<u32>,
    dependent_targets: Vec<CurveId>,
    next_dependent: Vec<u32>,

    name_index: HashMap<String, CurveId>,
}

impl CurveGraph {
    pub fn builder() -> CurveGraphBuilder { CurveGraphBuilder::new() }

    pub fn from_definitions(definitions: Vec<CurveDefinition>) -> Result<Self, GraphError> {
        let mut builder = CurveGraphBuilder::new();
        for def in definitions {
            builder.push(def);
        }
        builder.build()
    }

    /// Snapshots a metadata collaborator. Names the provider cannot size are reported as unknown.
    pub fn from_provider(provider: &impl CurveMetadataProvider) -> Result<Self, GraphError> {
        let mut builder = CurveGraphBuilder::new();
        for name in provider.all_curve_names() {
            let parameter_count = provider
                .number_of_parameters(&name)
                .ok_or_else(|| GraphError::UnknownCurve { name: name.clone() })?;
            let underlyings = provider.underlying_curve_names(&name);
            builder.push(CurveDefinition { name, parameter_count, underlyings });
        }
        builder.build()
    }

    pub fn count(&self) -> usize { self.names.len() }
    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn ids(&self) -> impl ExactSizeIterator<Item = CurveId> + '_ {
        (0..self.names.len()).map(CurveId::new)
    }

    pub fn id_of(&self, name: &str) -> Option<CurveId> { self.name_index.get(name).copied() }
    pub fn contains(&self, name: &str) -> bool { self.name_index.contains_key(name) }

    pub fn name(&self, id: CurveId) -> &str { &self.names[id.index()] }
    pub fn names(&self) -> &[String] { &self.names }
    pub fn parameter_count(&self, id: CurveId) -> usize { self.parameter_counts[id.index()] }
    pub fn declared_underlyings(&self, id: CurveId) -> &[String] { &self.declared_underlyings[id.index()] }

    /// Underlyings present in this graph, in declared order.
    #[inline(always)]
    pub fn underlyings(&self, id: CurveId) -> &[CurveId] {
        let (start, count) = self.underlying_ranges[id.index()];
        &self.underlyings_flat[start as usize..(start + count) as usize]
    }

    /// Declared underlyings that are not part of this graph.
    pub fn exogenous_underlyings(&self, id: CurveId) -> impl Iterator<Item = &str> + '_ {
        self.declared_underlyings[id.index()]
            .iter()
            .filter(move |name| !self.name_index.contains_key(name.as_str()))
            .map(String::as_str)
    }

    /// Curves that list `id` as an in-graph underlying (one entry per declaration).
    pub fn dependents(&self, id: CurveId) -> Dependents<'_> {
        Dependents { graph: self, edge: self.first_dependent[id.index()] }
    }
}

/// Linked-list walk over the dependents of one curve.
pub struct Dependents<'a> {
    graph: &'a CurveGraph,
    edge: u32,
}

impl Iterator for Dependents<'_> {
    type Item = CurveId;

    fn next(&mut self) -> Option<CurveId> {
        if self.edge == u32::MAX {
            return None;
        }
        let idx = self.edge as usize;
        self.edge = self.graph.next_dependent[idx];
        Some(self.graph.dependent_targets[idx])
    }
}

impl From<CurveGraph> for Vec<CurveDefinition> {
    fn from(graph: CurveGraph) -> Self {
        graph
            .names
            .into_iter()
            .zip(graph.parameter_counts)
            .zip(graph.declared_underlyings)
            .map(|((name, parameter_count), underlyings)| CurveDefinition { name, parameter_count, underlyings })
            .collect()
    }
}

impl TryFrom<Vec<CurveDefinition>> for CurveGraph {
    type Error = GraphError;

    fn try_from(definitions: Vec<CurveDefinition>) -> Result<Self, Self::Error> {
        CurveGraph::from_definitions(definitions)
    }
}

/// Collects curve definitions; underlyings may reference curves added later.
#[derive(Debug, Clone, Default)]
pub struct CurveGraphBuilder {
    definitions: Vec<CurveDefinition>,
}

impl CurveGraphBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn add_curve(mut self, name: impl Into<String>, parameter_count: usize, underlyings: &[&str]) -> Self {
        self.push(CurveDefinition::new(name, parameter_count, underlyings));
        self
    }

    pub fn push(&mut self, definition: CurveDefinition) {
        self.definitions.push(definition);
    }

    pub fn build(self) -> Result<CurveGraph, GraphError> {
        let count = self.definitions.len();
        let mut graph = CurveGraph {
            names: Vec::with_capacity(count),
            parameter_counts: Vec::with_capacity(count),
            declared_underlyings: Vec::with_capacity(count),
            underlying_ranges: Vec::with_capacity(count),
            first_dependent: vec![u32::MAX; count],
            name_index: HashMap::with_capacity(count),
            ..Default::default()
        };

        // 1. Names
        for (i, def) in self.definitions.iter().enumerate() {
            if graph.name_index.insert(def.name.clone(), CurveId::new(i)).is_some() {
                return Err(GraphError::DuplicateCurve { name: def.name.clone() });
            }
        }

        // 2. Resolve in-graph underlyings and register dependents
        for (i, def) in self.definitions.into_iter().enumerate() {
            let id = CurveId::new(i);
            let start = graph.underlyings_flat.len() as u32;
            for underlying in &def.underlyings {
                match graph.name_index.get(underlying) {
                    Some(&u) => {
                        graph.underlyings_flat.push(u);
                        let new_edge = graph.dependent_targets.len() as u32;
                        graph.dependent_targets.push(id);
                        graph.next_dependent.push(graph.first_dependent[u.index()]);
                        graph.first_dependent[u.index()] = new_edge;
                    }
                    None => debug!(curve = %def.name, underlying = %underlying, "exogenous underlying excluded from offsets"),
                }
            }
            let resolved = graph.underlyings_flat.len() as u32 - start;
            graph.underlying_ranges.push((start, resolved));

            graph.names.push(def.name);
            graph.parameter_counts.push(def.parameter_count);
            graph.declared_underlyings.push(def.underlyings);
        }

        Ok(graph)
    }
}
