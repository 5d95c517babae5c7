//! Error types for the transformation engine and its collaborators.
//!
//! - [`EntityError`] - Entity access (collaborator) failures
//! - [`ResolutionError`] - A transformer could not be located for a type
//! - [`TransformError`] - Errors raised while selecting or running strategies
//! - [`RegistryError`] - Startup registration problems
//! - [`StoreError`] - Seed data loading and lookup errors
//! - [`ConfigError`] - Environment configuration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::entity::EntityType;

// =============================================================================
// Entity Access Errors
// =============================================================================

/// Errors reported by an entity while reading its data.
#[derive(Debug, Error)]
pub enum EntityError {
    /// A relation exists but could not be loaded.
    #[error("Relation '{relation}' on {entity_type} could not be loaded: {message}")]
    RelationFailed {
        entity_type: EntityType,
        relation: String,
        message: String,
    },
}

// =============================================================================
// Resolution Errors
// =============================================================================

/// A transformer could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Nothing is registered for the entity type.
    #[error("No transformer registered for entity type '{0}'")]
    Unregistered(EntityType),

    /// The process-wide registry was never installed.
    #[error("No strategy registry has been installed")]
    NoRegistry,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised while selecting or executing a transformation.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The requested strategy key is not registered for the type.
    #[error("Transformation '{key}' does not exist for {entity_type}")]
    UnknownStrategy { entity_type: EntityType, key: String },

    /// A transformer for a related entity could not be located.
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// A typed strategy received an entity of another type.
    #[error("Strategy for {expected} cannot transform a {found}")]
    TypeMismatch {
        expected: EntityType,
        found: EntityType,
    },

    /// Strict mode: an inclusion named neither a relation nor a field.
    #[error("'{name}' is not a relation, getter or attribute of {entity_type}")]
    UnknownInclusion { entity_type: EntityType, name: String },

    /// Entity access failed.
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),
}

impl TransformError {
    /// True for configuration defects (as opposed to collaborator failures).
    pub fn is_configuration(&self) -> bool {
        !matches!(self, TransformError::Entity(_))
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors found while registering strategies at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type's default key has no strategy behind it.
    #[error("{entity_type} has no '{key}' strategy to use as its default")]
    MissingDefault { entity_type: EntityType, key: String },

    /// `set_default` named a key that was never registered.
    #[error("Cannot make '{key}' the default for {entity_type}: not registered")]
    UnknownStrategy { entity_type: EntityType, key: String },

    /// A process-wide registry is already installed.
    #[error("A strategy registry is already installed")]
    AlreadyInstalled,
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the in-memory blog store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the seed file.
    #[error("Failed to read seed data: {0}")]
    Io(#[from] std::io::Error),

    /// Seed data is not valid JSON.
    #[error("Invalid seed data: {0}")]
    Json(#[from] serde_json::Error),

    /// Two records of one collection share an id.
    #[error("Duplicate {collection} id {id}")]
    DuplicateId { collection: &'static str, id: u64 },

    /// A pivot row points at a missing record.
    #[error("post_tags row ({post_id}, {tag_id}) references a missing record")]
    DanglingPivot { post_id: u64, tag_id: u64 },

    /// Unknown collection name.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// No record with that id.
    #[error("No {collection} with id {id}")]
    NotFound { collection: &'static str, id: u64 },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Store lookup error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Socket error.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
