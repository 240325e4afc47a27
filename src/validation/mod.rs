//! Structural checks on a curve graph, run before any sensitivity arithmetic.
//!
//! Validation is fail-fast for computations (`Validator::validate`) and
//! exhaustive for reporting (`Validator::diagnose`).

pub use self::error::GraphError;
pub use self::validator::Validator;

// --- MODULE DECLARATIONS ---
mod error;
mod validator;
mod rules {
    pub mod membership;
    pub mod parameters;
    pub mod underlyings;
}
