//! Point sensitivities as produced by the pricing layer, and the projection
//! contract used to turn them into per-parameter vectors.

use crate::compute::ComputationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Sensitivity of a present value to the continuously compounded zero yield at `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountingPoint {
    pub time: f64,
    pub value: f64,
}

impl DiscountingPoint {
    pub fn new(time: f64, value: f64) -> Self { Self { time, value } }
}

/// Sensitivity of a present value to the simply compounded forward rate over `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardPoint {
    pub start: f64,
    pub end: f64,
    pub accrual: f64,
    pub value: f64,
}

impl ForwardPoint {
    pub fn new(start: f64, end: f64, accrual: f64, value: f64) -> Self {
        Self { start, end, accrual, value }
    }

    /// dF/dy(start) given the discount factors at both ends.
    pub fn derivative_to_yield_start(&self, df_start: f64, df_end: f64) -> f64 {
        -self.start * df_start / (df_end * self.accrual)
    }

    /// dF/dy(end) given the discount factors at both ends.
    pub fn derivative_to_yield_end(&self, df_start: f64, df_end: f64) -> f64 {
        self.end * df_start / (df_end * self.accrual)
    }
}

/// Raw point sensitivities of one priced instrument, grouped by curve name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveSensitivities {
    #[serde(default)]
    discounting: BTreeMap<String, Vec<DiscountingPoint>>,
    #[serde(default)]
    forward: BTreeMap<String, Vec<ForwardPoint>>,
}

impl CurveSensitivities {
    pub fn new() -> Self { Self::default() }

    pub fn of_discounting(curve: impl Into<String>, points: Vec<DiscountingPoint>) -> Self {
        let mut s = Self::new();
        s.discounting.insert(curve.into(), points);
        s
    }

    pub fn of_forward(curve: impl Into<String>, points: Vec<ForwardPoint>) -> Self {
        let mut s = Self::new();
        s.forward.insert(curve.into(), points);
        s
    }

    pub fn add_discounting(&mut self, curve: &str, point: DiscountingPoint) {
        self.discounting.entry(curve.to_string()).or_default().push(point);
    }

    pub fn add_forward(&mut self, curve: &str, point: ForwardPoint) {
        self.forward.entry(curve.to_string()).or_default().push(point);
    }

    pub fn discounting(&self, curve: &str) -> &[DiscountingPoint] {
        self.discounting.get(curve).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn forward(&self, curve: &str) -> &[ForwardPoint] {
        self.forward.get(curve).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every curve carrying at least one point in either collection.
    pub fn curve_names(&self) -> BTreeSet<&str> {
        let discounting = self.discounting.iter().filter(|(_, pts)| !pts.is_empty()).map(|(c, _)| c);
        let forward = self.forward.iter().filter(|(_, pts)| !pts.is_empty()).map(|(c, _)| c);
        discounting.chain(forward).map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.discounting.values().all(Vec::is_empty) && self.forward.values().all(Vec::is_empty)
    }

    /// Concatenates both sides, curve by curve.
    pub fn plus(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (curve, points) in &other.discounting {
            result.discounting.entry(curve.clone()).or_default().extend_from_slice(points);
        }
        for (curve, points) in &other.forward {
            result.forward.entry(curve.clone()).or_default().extend_from_slice(points);
        }
        result
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            discounting: self
                .discounting
                .iter()
                .map(|(c, pts)| (c.clone(), pts.iter().map(|p| DiscountingPoint { value: p.value * factor, ..*p }).collect()))
                .collect(),
            forward: self
                .forward
                .iter()
                .map(|(c, pts)| (c.clone(), pts.iter().map(|p| ForwardPoint { value: p.value * factor, ..*p }).collect()))
                .collect(),
        }
    }

    /// Sorts points, merges those sharing the same time (or period) and drops
    /// curves left without points.
    pub fn cleaned(&self) -> Self {
        let mut discounting = BTreeMap::new();
        for (curve, points) in &self.discounting {
            let mut sorted = points.clone();
            sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
            let mut merged: Vec<DiscountingPoint> = Vec::with_capacity(sorted.len());
            for p in sorted {
                match merged.last_mut() {
                    Some(last) if last.time == p.time => last.value += p.value,
                    _ => merged.push(p),
                }
            }
            if !merged.is_empty() {
                discounting.insert(curve.clone(), merged);
            }
        }

        let mut forward = BTreeMap::new();
        for (curve, points) in &self.forward {
            let mut sorted = points.clone();
            sorted.sort_by(|a, b| {
                a.start
                    .total_cmp(&b.start)
                    .then(a.end.total_cmp(&b.end))
                    .then(a.accrual.total_cmp(&b.accrual))
            });
            let mut merged: Vec<ForwardPoint> = Vec::with_capacity(sorted.len());
            for p in sorted {
                match merged.last_mut() {
                    Some(last) if last.start == p.start && last.end == p.end && last.accrual == p.accrual => {
                        last.value += p.value
                    }
                    _ => merged.push(p),
                }
            }
            if !merged.is_empty() {
                forward.insert(curve.clone(), merged);
            }
        }

        Self { discounting, forward }
    }
}

/// Pricing-layer collaborator projecting point sensitivities onto a curve's parameters.
///
/// Implementations must return exactly one value per raw parameter of the curve.
pub trait ParameterSensitivityProvider: Sync {
    fn parameter_sensitivity(&self, curve: &str, points: &[DiscountingPoint]) -> Result<Vec<f64>, ComputationError>;

    fn parameter_forward_sensitivity(&self, curve: &str, points: &[ForwardPoint]) -> Result<Vec<f64>, ComputationError>;
}
