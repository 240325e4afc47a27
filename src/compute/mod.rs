//! Turns raw point sensitivities into clean per-curve parameter sensitivities.
pub mod assemble;
pub mod dirty;
pub mod engine;
pub mod index;
pub mod kernel;
pub mod ledger;
pub mod redistribute;

pub use assemble::{CurveBlock, SensitivityResult};
pub use engine::SensitivityEngine;
pub use index::{CurveIndex, CurveIndexEntry, Route, UnderlyingBlock};
pub use ledger::{ComputationError, Ledger, ProjectionKind};
