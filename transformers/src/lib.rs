//! # Transformers - strategy based entity to JSON transformation
//!
//! Entities are turned into JSON by named strategies registered per entity
//! type. Callers pick a strategy and a set of dotted inclusion paths; related
//! entities named by those paths are embedded recursively, each with its own
//! type's default strategy.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Entity /  │────▶│    Shape    │────▶│  Transform  │────▶│  JSON Value │
//! │ Vec / Page  │     │  dispatcher │     │ (strategy + │     │  (object or │
//! └─────────────┘     └─────────────┘     │  inclusion) │     │   array)    │
//!                                         └──────┬──────┘     └─────────────┘
//!                                                │ related(name)
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │  Registry   │
//!                                         │ (per type)  │
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use transformers::{blog, Transformer};
//!
//! let registry = blog::strategies::registry();
//! let store = blog::Store::seeded()?;
//!
//! let json = Transformer::for_entity::<blog::User>(&registry)?
//!     .with(["posts.tags", "isOfAge"])
//!     .transform(store.users())?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`entity`] - The `Entity` capability trait and pagination windows
//! - [`registry`] - Named strategies per entity type
//! - [`transform`] - Inclusion paths, shape dispatch and the transformer
//! - [`blog`] - Demo domain: users, posts and tags
//! - [`config`] - Environment configuration
//! - [`logging`] - Tracing subscriber setup
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod entity;

// Strategies
pub mod registry;

// Transformation
pub mod transform;

// Demo domain
pub mod blog;

// Runtime
pub mod config;
pub mod logging;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    EntityError,
    RegistryError,
    ResolutionError,
    ServerError,
    StoreError,
    TransformError,
    TransformResult,
};

// =============================================================================
// Re-exports - Entities
// =============================================================================

pub use entity::{Entity, EntityRef, EntityType, Page, PageMeta, TypedEntity, Windowed};

// =============================================================================
// Re-exports - Registry
// =============================================================================

pub use registry::{Locator, Strategy, StrategyRegistry, TypeStrategies, DEFAULT_KEY};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{transform, InclusionTree, Mapping, Shape, Transformer};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::Config;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
