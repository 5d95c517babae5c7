//! Entity access capabilities consumed by the transformation engine.
//!
//! The engine never knows concrete domain types. It reads entities through
//! the [`Entity`] trait:
//!
//! - [`Entity::attribute`] - plain stored fields
//! - [`Entity::accessor`] - zero-argument getters (virtual fields)
//! - [`Entity::related`] - named relations, classified as a [`Shape`]
//!
//! Types are identified by a stable [`EntityType`] tag rather than by
//! runtime reflection.

pub mod page;

use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::EntityError;
use crate::transform::Shape;

pub use page::{Page, PageMeta, Windowed};

/// Stable identifier of an entity type (`"user"`, `"post"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityType(&'static str);

impl EntityType {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A domain record that can be transformed.
///
/// Implementations are read-only views; the engine never mutates them.
pub trait Entity: Send + Sync + 'static {
    /// The type tag used to locate this entity's transformer.
    fn entity_type(&self) -> EntityType;

    /// Read a stored attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Invoke a zero-argument getter.
    fn accessor(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Load a relation.
    ///
    /// Returns `Ok(None)` when `name` is not a relation of this type, and
    /// `Ok(Some(Shape::Absent))` for an empty to-one relation.
    fn related(&self, _name: &str) -> Result<Option<Shape>, EntityError> {
        Ok(None)
    }

    /// Used by typed strategies to recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Entities whose type tag is known at compile time.
pub trait TypedEntity: Entity {
    const TYPE: EntityType;
}

/// Shared handle to an entity.
pub type EntityRef = Arc<dyn Entity>;

impl fmt::Debug for dyn Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.attribute("id") {
            Some(id) => write!(f, "Entity({} #{})", self.entity_type(), id),
            None => write!(f, "Entity({})", self.entity_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note;

    impl Entity for Note {
        fn entity_type(&self) -> EntityType {
            EntityType::new("note")
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "id").then(|| Value::from(7))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_default_capabilities() {
        let note = Note;
        assert_eq!(note.accessor("anything"), None);
        assert!(note.related("anything").unwrap().is_none());
    }

    #[test]
    fn test_debug_includes_type_and_id() {
        let note: EntityRef = Arc::new(Note);
        assert_eq!(format!("{:?}", note), "Entity(note #7)");
    }

    #[test]
    fn test_entity_type_display() {
        assert_eq!(EntityType::new("user").to_string(), "user");
        assert_eq!(EntityType::new("user").as_str(), "user");
    }
}
