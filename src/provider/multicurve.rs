//! In-memory multicurve provider: curve metadata plus point-to-parameter projection.

use super::curve::YieldCurve;
use super::point::{DiscountingPoint, ForwardPoint, ParameterSensitivityProvider};
use crate::compute::ComputationError;
use crate::store::CurveMetadataProvider;
use crate::validation::GraphError;
use std::collections::HashMap;
use std::sync::Arc;

/// Named curves in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MulticurveProvider {
    curves: Vec<(String, Arc<YieldCurve>)>,
    by_name: HashMap<String, usize>,
}

impl MulticurveProvider {
    pub fn new() -> Self { Self::default() }

    /// Registers `curve` under `name`.
    ///
    /// Every underlying a curve embeds must have the parameter count of the curve
    /// registered under the same name, whichever of the two is added first.
    pub fn add(&mut self, name: impl Into<String>, curve: Arc<YieldCurve>) -> Result<(), GraphError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateCurve { name });
        }

        for (underlying, embedded) in curve.underlyings() {
            if let Some(registered) = self.curve(underlying) {
                check_underlying_size(&name, underlying, registered, embedded)?;
            }
        }
        for (dependent, existing) in &self.curves {
            for (underlying, embedded) in existing.underlyings().iter().filter(|(u, _)| *u == name) {
                check_underlying_size(dependent, underlying, &curve, embedded)?;
            }
        }
        self.by_name.insert(name.clone(), self.curves.len());
        self.curves.push((name, curve));
        Ok(())
    }

    pub fn curve(&self, name: &str) -> Option<&Arc<YieldCurve>> {
        self.by_name.get(name).map(|&i| &self.curves[i].1)
    }

    fn require(&self, name: &str) -> Result<&YieldCurve, ComputationError> {
        self.curve(name)
            .map(Arc::as_ref)
            .ok_or_else(|| GraphError::UnknownCurve { name: name.to_string() }.into())
    }
}

fn check_underlying_size(curve: &str, underlying: &str, registered: &YieldCurve, embedded: &YieldCurve) -> Result<(), GraphError> {
    let (registered, embedded) = (registered.parameter_count(), embedded.parameter_count());
    if registered != embedded {
        return Err(GraphError::UnderlyingSize {
            curve: curve.to_string(),
            underlying: underlying.to_string(),
            registered,
            embedded,
        });
    }
    Ok(())
}

impl CurveMetadataProvider for MulticurveProvider {
    fn all_curve_names(&self) -> Vec<String> {
        self.curves.iter().map(|(name, _)| name.clone()).collect()
    }

    fn number_of_parameters(&self, name: &str) -> Option<usize> {
        self.curve(name).map(|c| c.parameter_count())
    }

    fn underlying_curve_names(&self, name: &str) -> Vec<String> {
        self.curve(name).map(|c| c.underlying_names()).unwrap_or_default()
    }
}

impl ParameterSensitivityProvider for MulticurveProvider {
    fn parameter_sensitivity(&self, curve: &str, points: &[DiscountingPoint]) -> Result<Vec<f64>, ComputationError> {
        let c = self.require(curve)?;
        let mut result = vec![0.0; c.parameter_count()];
        for point in points {
            let sensitivity = c.parameter_sensitivity(point.time);
            for (r, s) in result.iter_mut().zip(&sensitivity) {
                *r += point.value * s;
            }
        }
        Ok(result)
    }

    fn parameter_forward_sensitivity(&self, curve: &str, points: &[ForwardPoint]) -> Result<Vec<f64>, ComputationError> {
        let c = self.require(curve)?;
        let mut result = vec![0.0; c.parameter_count()];
        for point in points {
            // Only dPV/dF is known; chain through the pseudo-discount factors at both ends.
            let df_start = c.discount_factor(point.start);
            let df_end = c.discount_factor(point.end);
            let d_start = point.derivative_to_yield_start(df_start, df_end);
            let d_end = point.derivative_to_yield_end(df_start, df_end);
            let sens_start = c.parameter_sensitivity(point.start);
            let sens_end = c.parameter_sensitivity(point.end);
            for i in 0..result.len() {
                result[i] += point.value * (d_start * sens_start[i] + d_end * sens_end[i]);
            }
        }
        Ok(result)
    }
}
