//! dirty.rs
//! Builds the raw per-curve vectors: discounting and forward projections summed elementwise.

use super::kernel;
use super::ledger::{ComputationError, Ledger, ProjectionKind};
use crate::config::EngineConfig;
use crate::provider::{CurveSensitivities, ParameterSensitivityProvider};
use crate::store::{CurveGraph, CurveId};
use crate::validation::GraphError;
use rayon::prelude::*;
use std::collections::HashMap;

pub struct Accumulator<'a, P: ParameterSensitivityProvider + ?Sized> {
    graph: &'a CurveGraph,
    provider: &'a P,
}

impl<'a, P: ParameterSensitivityProvider + ?Sized> Accumulator<'a, P> {
    pub fn new(graph: &'a CurveGraph, provider: &'a P) -> Self {
        Self { graph, provider }
    }

    /// One dirty vector of length `parameter_count` per curve of the graph.
    ///
    /// Curves without raw points get a zero vector and never reach the provider.
    /// Raw points on curves outside the graph are an error rather than being dropped;
    /// a foreign name with no points is ignored.
    pub fn accumulate(&self, raw: &CurveSensitivities, config: &EngineConfig) -> Result<Ledger, ComputationError> {
        if let Some(name) = raw.curve_names().into_iter().find(|name| !self.graph.contains(name)) {
            return Err(GraphError::UnknownCurve { name: name.to_string() }.into());
        }

        let ids: Vec<CurveId> = self.graph.ids().collect();
        let vectors: Vec<Vec<f64>> = if config.use_parallel(ids.len()) {
            ids.par_iter().map(|&id| self.dirty_vector(id, raw)).collect::<Result<Vec<_>, ComputationError>>()?
        } else {
            ids.iter().map(|&id| self.dirty_vector(id, raw)).collect::<Result<Vec<_>, ComputationError>>()?
        };

        let mut ledger = Ledger::with_capacity(ids.len());
        for (id, vector) in ids.into_iter().zip(vectors) {
            ledger.insert(id, vector);
        }
        Ok(ledger)
    }

    fn dirty_vector(&self, id: CurveId, raw: &CurveSensitivities) -> Result<Vec<f64>, ComputationError> {
        let name = self.graph.name(id);
        let expected = self.graph.parameter_count(id);
        let mut dirty = vec![0.0; expected];

        let discounting = raw.discounting(name);
        if !discounting.is_empty() {
            let projected = self.provider.parameter_sensitivity(name, discounting)?;
            check_projection(name, ProjectionKind::Discounting, expected, &projected)?;
            kernel::add_assign(&mut dirty, &projected);
        }

        let forward = raw.forward(name);
        if !forward.is_empty() {
            let projected = self.provider.parameter_forward_sensitivity(name, forward)?;
            check_projection(name, ProjectionKind::Forward, expected, &projected)?;
            kernel::add_assign(&mut dirty, &projected);
        }

        Ok(dirty)
    }
}

fn check_projection(curve: &str, kind: ProjectionKind, expected: usize, projected: &[f64]) -> Result<(), ComputationError> {
    if projected.len() != expected {
        return Err(ComputationError::Projection {
            curve: curve.to_string(),
            kind,
            expected,
            actual: projected.len(),
        });
    }
    Ok(())
}

/// Loads caller-supplied dirty vectors. Missing curves are zero.
pub fn ledger_from_vectors(graph: &CurveGraph, dirty: &HashMap<String, Vec<f64>>) -> Result<Ledger, ComputationError> {
    let mut ledger = Ledger::with_capacity(graph.count());
    for (name, vector) in dirty {
        let id = graph
            .id_of(name)
            .ok_or_else(|| GraphError::UnknownCurve { name: name.clone() })?;
        let expected = graph.parameter_count(id);
        if vector.len() != expected {
            return Err(ComputationError::DirtyLength { curve: name.clone(), expected, actual: vector.len() });
        }
        ledger.insert(id, vector.clone());
    }
    for id in graph.ids() {
        if ledger.get(id).is_none() {
            ledger.insert(id, vec![0.0; graph.parameter_count(id)]);
        }
    }
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DiscountingPoint, ForwardPoint};

    /// Projects every point onto parameter 0 of a curve with a fixed size,
    /// optionally returning the wrong length.
    struct FixedProvider {
        size: usize,
        forward_size: usize,
    }

    impl ParameterSensitivityProvider for FixedProvider {
        fn parameter_sensitivity(&self, _curve: &str, points: &[DiscountingPoint]) -> Result<Vec<f64>, ComputationError> {
            let mut v = vec![0.0; self.size];
            v[0] = points.iter().map(|p| p.value).sum();
            Ok(v)
        }

        fn parameter_forward_sensitivity(&self, _curve: &str, points: &[ForwardPoint]) -> Result<Vec<f64>, ComputationError> {
            let mut v = vec![1.0; self.forward_size];
            if let Some(first) = v.first_mut() {
                *first = points.iter().map(|p| p.value).sum();
            }
            Ok(v)
        }
    }

    fn graph() -> CurveGraph {
        CurveGraph::builder()
            .add_curve("OIS", 3, &[])
            .add_curve("FWD", 3, &[])
            .build()
            .unwrap()
    }

    #[test]
    fn test_discounting_and_forward_are_summed() {
        let graph = graph();
        let provider = FixedProvider { size: 3, forward_size: 3 };
        let mut raw = CurveSensitivities::of_discounting("OIS", vec![DiscountingPoint::new(1.0, 2.0)]);
        raw.add_forward("OIS", ForwardPoint::new(1.0, 2.0, 1.0, 5.0));

        let ledger = Accumulator::new(&graph, &provider).accumulate(&raw, &EngineConfig::default()).unwrap();
        assert_eq!(ledger.get(graph.id_of("OIS").unwrap()), Some(&[7.0, 1.0, 1.0][..]));
        assert_eq!(ledger.get(graph.id_of("FWD").unwrap()), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_projection_length_mismatch_surfaces() {
        let graph = graph();
        let provider = FixedProvider { size: 3, forward_size: 2 };
        let raw = CurveSensitivities::of_forward("FWD", vec![ForwardPoint::new(1.0, 2.0, 1.0, 5.0)]);

        let err = Accumulator::new(&graph, &provider).accumulate(&raw, &EngineConfig::sequential()).unwrap_err();
        assert_eq!(
            err,
            ComputationError::Projection { curve: "FWD".into(), kind: ProjectionKind::Forward, expected: 3, actual: 2 }
        );
    }

    #[test]
    fn test_raw_points_on_unknown_curve_rejected() {
        let graph = graph();
        let provider = FixedProvider { size: 3, forward_size: 3 };
        let raw = CurveSensitivities::of_discounting("CHF", vec![DiscountingPoint::new(1.0, 1.0)]);
        let err = Accumulator::new(&graph, &provider).accumulate(&raw, &EngineConfig::default()).unwrap_err();
        assert_eq!(err, ComputationError::Graph(GraphError::UnknownCurve { name: "CHF".into() }));
    }

    #[test]
    fn test_unknown_curve_without_points_is_ignored() {
        let graph = graph();
        let provider = FixedProvider { size: 3, forward_size: 3 };
        let mut raw = CurveSensitivities::of_forward("OTHER", vec![]);
        raw.add_discounting("OIS", DiscountingPoint::new(1.0, 2.0));

        let ledger = Accumulator::new(&graph, &provider).accumulate(&raw, &EngineConfig::default()).unwrap();
        assert_eq!(ledger.total(), 2.0);

        raw.add_forward("OTHER", ForwardPoint::new(1.0, 2.0, 1.0, 5.0));
        let err = Accumulator::new(&graph, &provider).accumulate(&raw, &EngineConfig::default()).unwrap_err();
        assert_eq!(err, ComputationError::Graph(GraphError::UnknownCurve { name: "OTHER".into() }));
    }

    #[test]
    fn test_vectors_fill_missing_curves_with_zero() {
        let graph = graph();
        let dirty = HashMap::from([("FWD".to_string(), vec![1.0, 2.0, 3.0])]);
        let ledger = ledger_from_vectors(&graph, &dirty).unwrap();
        assert_eq!(ledger.get(graph.id_of("OIS").unwrap()), Some(&[0.0; 3][..]));
        assert_eq!(ledger.total(), 6.0);
    }

    #[test]
    fn test_vectors_with_wrong_length_rejected() {
        let graph = graph();
        let dirty = HashMap::from([("OIS".to_string(), vec![1.0])]);
        let err = ledger_from_vectors(&graph, &dirty).unwrap_err();
        assert_eq!(err, ComputationError::DirtyLength { curve: "OIS".into(), expected: 3, actual: 1 });
    }
}
