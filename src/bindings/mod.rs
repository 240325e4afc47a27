//! Python-facing facade, compiled only with the `python` feature.
pub mod python;
