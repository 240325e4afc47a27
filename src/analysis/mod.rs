//! Graph-level analysis: evaluation order and routing statistics.
pub mod telemetry;
pub mod topology;

pub use telemetry::RoutingReport;
