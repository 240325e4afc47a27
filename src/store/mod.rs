//! Curve graph storage: identifiers, declarations and the immutable snapshot.
pub mod registry;
pub mod types;

pub use registry::{CurveGraph, CurveGraphBuilder, Dependents};
pub use types::{CurveDefinition, CurveId, CurveMetadataProvider};
