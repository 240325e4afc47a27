//! Yield curves able to report the sensitivity of their zero yield to their own parameters.

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("Invalid curve nodes: {0}")]
    InvalidNodes(String),
}

/// Zero yields at node times, linearly interpolated and flat outside the nodes.
/// Each node yield is one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedCurve {
    times: Vec<f64>,
    yields: Vec<f64>,
}

impl InterpolatedCurve {
    pub fn new(times: Vec<f64>, yields: Vec<f64>) -> Result<Self, CurveError> {
        if times.is_empty() {
            return Err(CurveError::InvalidNodes("at least one node is required".into()));
        }
        if times.len() != yields.len() {
            return Err(CurveError::InvalidNodes(format!(
                "{} times but {} yields",
                times.len(),
                yields.len()
            )));
        }
        if times.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(CurveError::InvalidNodes("node times must be strictly increasing".into()));
        }
        Ok(Self { times, yields })
    }

    pub fn parameter_count(&self) -> usize { self.times.len() }

    /// Index of the left node and weight of the right node for time `t`.
    /// `t` must not be NaN.
    fn bracket(&self, t: f64) -> (usize, f64) {
        let n = self.times.len();
        if n == 1 || t <= self.times[0] {
            return (0, 0.0);
        }
        if t >= self.times[n - 1] {
            return (n - 1, 0.0);
        }
        let right = self.times.partition_point(|&x| x <= t);
        let left = right - 1;
        let w = (t - self.times[left]) / (self.times[right] - self.times[left]);
        (left, w)
    }

    pub fn yield_at(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        let (left, w) = self.bracket(t);
        if w == 0.0 {
            return self.yields[left];
        }
        (1.0 - w) * self.yields[left] + w * self.yields[left + 1]
    }

    /// d y(t) / d yield_i for every node.
    pub fn parameter_sensitivity(&self, t: f64) -> Vec<f64> {
        let mut sensitivity = vec![0.0; self.times.len()];
        self.write_parameter_sensitivity(t, &mut sensitivity);
        sensitivity
    }

    fn write_parameter_sensitivity(&self, t: f64, out: &mut [f64]) {
        // An undefined time has undefined weights on every node.
        if t.is_nan() {
            out.iter_mut().for_each(|o| *o = f64::NAN);
            return;
        }
        let (left, w) = self.bracket(t);
        out[left] += 1.0 - w;
        if w != 0.0 {
            out[left + 1] += w;
        }
    }
}

/// A curve whose yield is the sum of named underlying curves plus an own spread.
///
/// Parameters are laid out as every underlying's full parameter vector, in
/// declared order, followed by the spread nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadCurve {
    underlyings: Vec<(String, Arc<YieldCurve>)>,
    spread: InterpolatedCurve,
}

impl SpreadCurve {
    pub fn new(underlyings: Vec<(String, Arc<YieldCurve>)>, spread: InterpolatedCurve) -> Self {
        Self { underlyings, spread }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum YieldCurve {
    Interpolated(InterpolatedCurve),
    Spread(SpreadCurve),
}

impl YieldCurve {
    pub fn parameter_count(&self) -> usize {
        match self {
            YieldCurve::Interpolated(c) => c.parameter_count(),
            YieldCurve::Spread(s) => {
                s.underlyings.iter().map(|(_, u)| u.parameter_count()).sum::<usize>() + s.spread.parameter_count()
            }
        }
    }

    /// The curves this one is built on, in block order.
    pub fn underlyings(&self) -> &[(String, Arc<YieldCurve>)] {
        match self {
            YieldCurve::Interpolated(_) => &[],
            YieldCurve::Spread(s) => &s.underlyings,
        }
    }

    pub fn underlying_names(&self) -> Vec<String> {
        match self {
            YieldCurve::Interpolated(_) => Vec::new(),
            YieldCurve::Spread(s) => s.underlyings.iter().map(|(name, _)| name.clone()).collect(),
        }
    }

    pub fn yield_at(&self, t: f64) -> f64 {
        match self {
            YieldCurve::Interpolated(c) => c.yield_at(t),
            YieldCurve::Spread(s) => s.underlyings.iter().map(|(_, u)| u.yield_at(t)).sum::<f64>() + s.spread.yield_at(t),
        }
    }

    pub fn discount_factor(&self, t: f64) -> f64 {
        (-self.yield_at(t) * t).exp()
    }

    /// d y(t) / d p for every raw parameter `p`, underlying blocks first.
    pub fn parameter_sensitivity(&self, t: f64) -> Vec<f64> {
        let mut out = vec![0.0; self.parameter_count()];
        self.write_parameter_sensitivity(t, &mut out);
        out
    }

    fn write_parameter_sensitivity(&self, t: f64, out: &mut [f64]) {
        match self {
            YieldCurve::Interpolated(c) => c.write_parameter_sensitivity(t, out),
            YieldCurve::Spread(s) => {
                let mut offset = 0;
                for (_, u) in &s.underlyings {
                    let n = u.parameter_count();
                    u.write_parameter_sensitivity(t, &mut out[offset..offset + n]);
                    offset += n;
                }
                s.spread.write_parameter_sensitivity(t, &mut out[offset..]);
            }
        }
    }
}

impl From<InterpolatedCurve> for YieldCurve {
    fn from(c: InterpolatedCurve) -> Self { YieldCurve::Interpolated(c) }
}

impl From<SpreadCurve> for YieldCurve {
    fn from(s: SpreadCurve) -> Self { YieldCurve::Spread(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ois() -> InterpolatedCurve {
        InterpolatedCurve::new(vec![1.0, 2.0, 5.0], vec![0.01, 0.02, 0.03]).unwrap()
    }

    #[rstest]
    #[case(0.5, 0.01)]
    #[case(1.5, 0.015)]
    #[case(3.5, 0.025)]
    #[case(10.0, 0.03)]
    fn test_linear_interpolation_with_flat_extrapolation(#[case] t: f64, #[case] expected: f64) {
        assert!((ois().yield_at(t) - expected).abs() < 1e-15);
    }

    #[rstest]
    #[case(0.5, vec![1.0, 0.0, 0.0])]
    #[case(1.5, vec![0.5, 0.5, 0.0])]
    #[case(2.0, vec![0.0, 1.0, 0.0])]
    #[case(6.0, vec![0.0, 0.0, 1.0])]
    fn test_node_weights(#[case] t: f64, #[case] expected: Vec<f64>) {
        assert_eq!(ois().parameter_sensitivity(t), expected);
    }

    #[test]
    fn test_nan_time_propagates() {
        assert!(ois().yield_at(f64::NAN).is_nan());
        assert!(ois().parameter_sensitivity(f64::NAN).iter().all(|w| w.is_nan()));

        let base = Arc::new(YieldCurve::from(ois()));
        let spread = InterpolatedCurve::new(vec![1.0], vec![0.001]).unwrap();
        let curve = YieldCurve::from(SpreadCurve::new(vec![("OIS".into(), base)], spread));
        assert_eq!(curve.parameter_sensitivity(f64::NAN).len(), 4);
        assert!(curve.parameter_sensitivity(f64::NAN).iter().all(|w| w.is_nan()));
        assert!(curve.discount_factor(f64::NAN).is_nan());
    }

    #[rstest]
    #[case(f64::INFINITY, vec![0.0, 0.0, 1.0])]
    #[case(f64::NEG_INFINITY, vec![1.0, 0.0, 0.0])]
    fn test_infinite_time_extrapolates_flat(#[case] t: f64, #[case] expected: Vec<f64>) {
        assert_eq!(ois().parameter_sensitivity(t), expected);
    }

    #[test]
    fn test_invalid_nodes() {
        assert!(InterpolatedCurve::new(vec![], vec![]).is_err());
        assert!(InterpolatedCurve::new(vec![1.0, 1.0], vec![0.0, 0.0]).is_err());
        assert!(InterpolatedCurve::new(vec![1.0], vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_spread_curve_lays_out_underlying_block_first() {
        let base = Arc::new(YieldCurve::from(ois()));
        let spread = InterpolatedCurve::new(vec![1.0, 3.0], vec![0.001, 0.002]).unwrap();
        let curve = YieldCurve::from(SpreadCurve::new(vec![("OIS".into(), base)], spread));

        assert_eq!(curve.parameter_count(), 5);
        assert_eq!(curve.underlying_names(), vec!["OIS".to_string()]);
        assert!((curve.yield_at(2.0) - (0.02 + 0.0015)).abs() < 1e-15);
        assert_eq!(curve.parameter_sensitivity(2.0), vec![0.0, 1.0, 0.0, 0.5, 0.5]);
        assert!((curve.discount_factor(2.0) - (-(0.0215f64) * 2.0).exp()).abs() < 1e-15);
    }
}
