use serde::{Deserialize, Serialize};

/// Dense identifier of a curve inside one `CurveGraph` (its insertion position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CurveId(pub u32);

impl CurveId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// Declarative description of one curve, as read from JSON or a metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveDefinition {
    pub name: String,
    /// Total raw parameters exposed by the pricing layer, underlying blocks included.
    pub parameter_count: usize,
    /// Curves used to build this one, in block order.
    #[serde(default)]
    pub underlyings: Vec<String>,
}

impl CurveDefinition {
    pub fn new(name: impl Into<String>, parameter_count: usize, underlyings: &[&str]) -> Self {
        Self {
            name: name.into(),
            parameter_count,
            underlyings: underlyings.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Collaborator exposing the curve metadata of a multicurve set.
pub trait CurveMetadataProvider {
    /// Curve names in a stable order; this order becomes the graph's insertion order.
    fn all_curve_names(&self) -> Vec<String>;
    fn number_of_parameters(&self, name: &str) -> Option<usize>;
    fn underlying_curve_names(&self, name: &str) -> Vec<String>;
}
