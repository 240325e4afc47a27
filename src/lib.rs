// Curve sensitivity core: decomposes dirty curve sensitivities into clean,
// per-curve parameter sensitivities over a curve dependency graph.
// With the `python` feature, this file also defines the `_core` Python module.

pub mod analysis;
pub mod compute;
pub mod config;
pub mod display;
pub mod provider;
pub mod store;
pub mod validation;

#[cfg(feature = "python")]
pub mod bindings;

pub use compute::{ComputationError, CurveBlock, Ledger, SensitivityEngine, SensitivityResult};
pub use config::{ConfigError, EngineConfig};
pub use provider::{CurveSensitivities, DiscountingPoint, ForwardPoint, ParameterSensitivityProvider};
pub use store::{CurveDefinition, CurveGraph, CurveId, CurveMetadataProvider};
pub use validation::{GraphError, Validator};

#[cfg(feature = "python")]
use pyo3::prelude::*;

// --- Module Definition ---
/// The `_core` Python module. The name marks it as an internal, compiled component.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(bindings::python::rust_core_version, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::python::clean_sensitivities, m)?)?;
    Ok(())
}
