//! Collaborators of the sensitivity engine: point sensitivities from the pricing
//! layer, their projection onto curve parameters, and curve metadata.
pub mod curve;
pub mod multicurve;
pub mod point;

pub use curve::{CurveError, InterpolatedCurve, SpreadCurve, YieldCurve};
pub use multicurve::MulticurveProvider;
pub use point::{CurveSensitivities, DiscountingPoint, ForwardPoint, ParameterSensitivityProvider};
