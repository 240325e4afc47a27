use crate::compute::SensitivityEngine;
use crate::config::EngineConfig;
use crate::store::{CurveDefinition, CurveGraph};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

/// A simple function to confirm the Rust core is callable from Python.
#[pyfunction]
pub fn rust_core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Clean sensitivities for `requested`, concatenated in that order.
///
/// `curves` holds `(name, parameter_count, underlyings)` tuples and `dirty` maps
/// curve names to dirty vectors; curves missing from `dirty` count as zero.
#[pyfunction]
pub fn clean_sensitivities(
    curves: Vec<(String, usize, Vec<String>)>,
    dirty: HashMap<String, Vec<f64>>,
    requested: Vec<String>,
) -> PyResult<Vec<f64>> {
    let definitions = curves
        .into_iter()
        .map(|(name, parameter_count, underlyings)| CurveDefinition { name, parameter_count, underlyings })
        .collect();
    let graph = CurveGraph::from_definitions(definitions).map_err(to_py_err)?;
    let engine = SensitivityEngine::new(&graph, EngineConfig::default()).map_err(to_py_err)?;
    let result = engine.compute_from_dirty(&dirty, &requested).map_err(to_py_err)?;
    Ok(result.into_values())
}

fn to_py_err(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}
