//! The sensitivity pipeline: validate, index, accumulate, redistribute, assemble.
use super::assemble::{assemble, SensitivityResult};
use super::dirty::{ledger_from_vectors, Accumulator};
use super::index::CurveIndex;
use super::ledger::{ComputationError, Ledger};
use super::redistribute::Redistributor;
use crate::analysis::telemetry::RoutingReport;
use crate::config::EngineConfig;
use crate::provider::{CurveSensitivities, ParameterSensitivityProvider};
use crate::store::CurveGraph;
use crate::validation::Validator;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Decomposes dirty curve sensitivities into clean per-curve vectors.
///
/// Construction validates the graph and builds its [`CurveIndex`] once; the
/// engine can then be run for any number of instruments against the same graph.
/// Every run is a pure function of its inputs and either returns a complete
/// result or an error, never a partial vector.
pub struct SensitivityEngine<'a> {
    graph: &'a CurveGraph,
    index: CurveIndex,
    config: EngineConfig,
}

impl<'a> SensitivityEngine<'a> {
    pub fn new(graph: &'a CurveGraph, config: EngineConfig) -> Result<Self, ComputationError> {
        let index = CurveIndex::build(graph, &config)?;
        let report = RoutingReport::analyze(graph, &index);
        debug!(
            curves = report.curves,
            depth = report.depth,
            routed_blocks = report.routed_blocks,
            exogenous = report.exogenous_references,
            "sensitivity engine ready"
        );
        Ok(Self { graph, index, config })
    }

    pub fn graph(&self) -> &CurveGraph { self.graph }
    pub fn index(&self) -> &CurveIndex { &self.index }
    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Full pipeline from raw point sensitivities.
    #[instrument(skip_all, fields(curves = self.graph.count(), requested = requested.len()))]
    pub fn compute<P, S>(&self, provider: &P, raw: &CurveSensitivities, requested: &[S]) -> Result<SensitivityResult, ComputationError>
    where
        P: ParameterSensitivityProvider + ?Sized,
        S: AsRef<str>,
    {
        Validator::new(self.graph).validate_requested(requested)?;
        let dirty = Accumulator::new(self.graph, provider).accumulate(raw, &self.config)?;
        self.finish(&dirty, requested)
    }

    /// Pipeline from already projected dirty vectors, keyed by curve name. Curves
    /// absent from the map contribute zeros.
    #[instrument(skip_all, fields(curves = self.graph.count(), requested = requested.len()))]
    pub fn compute_from_dirty<S: AsRef<str>>(&self, dirty: &HashMap<String, Vec<f64>>, requested: &[S]) -> Result<SensitivityResult, ComputationError> {
        Validator::new(self.graph).validate_requested(requested)?;
        let dirty = ledger_from_vectors(self.graph, dirty)?;
        self.finish(&dirty, requested)
    }

    /// Clean vectors for every curve of the graph, requested or not.
    pub fn clean_vectors(&self, dirty: &Ledger) -> Result<Ledger, ComputationError> {
        let clean = Redistributor::new(self.graph, &self.index).redistribute(dirty, &self.config)?;
        if self.config.verify_conservation {
            self.verify_conservation(dirty, &clean)?;
        }
        Ok(clean)
    }

    fn finish<S: AsRef<str>>(&self, dirty: &Ledger, requested: &[S]) -> Result<SensitivityResult, ComputationError> {
        let clean = self.clean_vectors(dirty)?;
        let result = assemble(self.graph, &clean, requested)?;
        info!(curves = self.graph.count(), requested = requested.len(), output_len = result.len(), "sensitivities assembled");
        Ok(result)
    }

    fn verify_conservation(&self, dirty: &Ledger, clean: &Ledger) -> Result<(), ComputationError> {
        let dirty_total = dirty.total();
        let clean_total = clean.total();

        if !dirty_total.is_finite() || !clean_total.is_finite() {
            warn!(dirty_total, clean_total, "non-finite sensitivities, conservation check skipped");
            return Ok(());
        }

        // Regrouped sums of cancelling terms differ by rounding proportional to the
        // gross magnitude, not the net total.
        let tolerance = self.config.conservation_tolerance * dirty.absolute_total().max(1.0);
        if (dirty_total - clean_total).abs() > tolerance {
            return Err(ComputationError::ConservationViolation { dirty_total, clean_total });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DiscountingPoint, InterpolatedCurve, MulticurveProvider, SpreadCurve, YieldCurve};
    use crate::store::CurveId;
    use crate::validation::GraphError;
    use std::sync::Arc;

    fn chain() -> CurveGraph {
        CurveGraph::builder()
            .add_curve("A", 5, &[])
            .add_curve("B", 8, &["A"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_two_curve_chain_result_vector() {
        let graph = chain();
        let engine = SensitivityEngine::new(&graph, EngineConfig::default()).unwrap();
        let dirty = HashMap::from([
            ("A".to_string(), vec![0.0; 5]),
            ("B".to_string(), vec![1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]),
        ]);
        let result = engine.compute_from_dirty(&dirty, &["A", "B"]).unwrap();
        assert_eq!(result.values(), &[1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_unknown_requested_name_stops_before_math() {
        let graph = chain();
        let engine = SensitivityEngine::new(&graph, EngineConfig::default()).unwrap();
        // The dirty vector is malformed as well; the name check must fire first.
        let dirty = HashMap::from([("A".to_string(), vec![0.0; 2])]);
        let err = engine.compute_from_dirty(&dirty, &["C"]).unwrap_err();
        assert_eq!(err, ComputationError::Graph(GraphError::UnknownCurve { name: "C".into() }));
    }

    #[test]
    fn test_cycle_rejected_at_construction() {
        let graph = CurveGraph::builder()
            .add_curve("X", 2, &["Y"])
            .add_curve("Y", 2, &["X"])
            .build()
            .unwrap();
        let err = SensitivityEngine::new(&graph, EngineConfig::default()).err().unwrap();
        assert!(matches!(err, ComputationError::Graph(GraphError::Cycle { .. })));
    }

    #[test]
    fn test_nan_propagates_without_conservation_error() {
        let graph = chain();
        let engine = SensitivityEngine::new(&graph, EngineConfig::default()).unwrap();
        let mut b = vec![0.0; 8];
        b[6] = f64::NAN;
        let result = engine.compute_from_dirty(&HashMap::from([("B".to_string(), b)]), &["B"]).unwrap();
        assert!(result.values()[1].is_nan());
        assert_eq!(result.values()[0], 0.0);
    }

    #[test]
    fn test_nan_point_time_reaches_the_output() {
        let ois = Arc::new(YieldCurve::from(InterpolatedCurve::new(vec![1.0, 2.0], vec![0.01, 0.02]).unwrap()));
        let mut provider = MulticurveProvider::new();
        provider.add("OIS", ois).unwrap();
        let graph = CurveGraph::from_provider(&provider).unwrap();
        let engine = SensitivityEngine::new(&graph, EngineConfig::default()).unwrap();

        let raw = CurveSensitivities::of_discounting("OIS", vec![DiscountingPoint::new(f64::NAN, 1.0)]);
        let result = engine.compute(&provider, &raw, &["OIS"]).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_cancelling_magnitudes_pass_conservation() {
        let graph = CurveGraph::builder()
            .add_curve("B", 3, &["A"])
            .add_curve("A", 1, &[])
            .build()
            .unwrap();
        let engine = SensitivityEngine::new(&graph, EngineConfig::default()).unwrap();
        let dirty = HashMap::from([
            ("B".to_string(), vec![1e17, -1e17, 0.0]),
            ("A".to_string(), vec![1.0]),
        ]);
        // Σdirty rounds to 1, Σclean to 0: a gap of 1 against a gross size of 2e17.
        let result = engine.compute_from_dirty(&dirty, &["A", "B"]).unwrap();
        assert_eq!(result.values(), &[1e17, -1e17, 0.0]);
    }

    #[test]
    fn test_clean_vectors_cover_unrequested_curves() {
        let graph = chain();
        let engine = SensitivityEngine::new(&graph, EngineConfig::sequential()).unwrap();
        let mut dirty = Ledger::new();
        dirty.insert(CurveId::new(0), vec![0.0; 5]);
        dirty.insert(CurveId::new(1), vec![3.0; 8]);
        let clean = engine.clean_vectors(&dirty).unwrap();
        assert_eq!(clean.get(CurveId::new(0)), Some(&[3.0; 5][..]));
        assert_eq!(clean.total(), 24.0);
    }

    #[test]
    fn test_full_pipeline_with_provider() {
        let ois = Arc::new(YieldCurve::from(InterpolatedCurve::new(vec![1.0, 2.0], vec![0.01, 0.02]).unwrap()));
        let spread = InterpolatedCurve::new(vec![1.0, 2.0], vec![0.001, 0.002]).unwrap();
        let fwd = Arc::new(YieldCurve::from(SpreadCurve::new(vec![("OIS".into(), ois.clone())], spread)));
        let mut provider = MulticurveProvider::new();
        provider.add("OIS", ois).unwrap();
        provider.add("FWD", fwd).unwrap();

        let graph = CurveGraph::from_provider(&provider).unwrap();
        let engine = SensitivityEngine::new(&graph, EngineConfig::default()).unwrap();

        let mut raw = CurveSensitivities::new();
        raw.add_discounting("OIS", DiscountingPoint::new(1.0, 10.0));
        raw.add_discounting("FWD", DiscountingPoint::new(1.5, 4.0));

        let result = engine.compute(&provider, &raw, &["FWD", "OIS"]).unwrap();
        // FWD dirty = [2, 2 | 2, 2]; its OIS block folds into OIS = [10 + 2, 0 + 2].
        assert_eq!(result.block("FWD"), Some(&[2.0, 2.0][..]));
        assert_eq!(result.block("OIS"), Some(&[12.0, 2.0][..]));
        assert_eq!(result.values(), &[2.0, 2.0, 12.0, 2.0]);
    }
}
