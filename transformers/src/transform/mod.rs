//! Transformation module.
//!
//! This module turns entities into JSON mappings:
//! - Inclusion: dotted path parsing into an inclusion tree
//! - Shape: single / sequence / window classification and dispatch
//! - Engine: per-entity strategy execution and relation embedding
//! - Transformer: the configured entry point callers use

pub mod engine;
pub mod inclusion;
pub mod shape;
pub mod transformer;

/// Output of a strategy for one entity.
pub type Mapping = serde_json::Map<String, serde_json::Value>;

pub use engine::transform_one;
pub use inclusion::InclusionTree;
pub use shape::{dispatch, Shape};
pub use transformer::{transform, Transformer};
