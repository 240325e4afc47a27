//! Human-readable renderings of graphs and results.
pub mod graphviz;
pub mod report;

pub use graphviz::to_dot;
pub use report::format_breakdown;
