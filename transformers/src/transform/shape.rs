//! Shape Dispatcher
//!
//! Input is classified once into a [`Shape`]; [`dispatch`] applies a
//! per-entity transformation and keeps the output shape:
//!
//! | Shape      | Output                         |
//! |------------|--------------------------------|
//! | `Absent`   | `null`                         |
//! | `Single`   | object                         |
//! | `Sequence` | array of objects (source order) |
//! | `Window`   | array of objects (source order) |

use serde_json::Value;
use std::fmt;

use super::Mapping;
use crate::entity::{Entity, EntityRef, Page, Windowed};
use crate::error::TransformResult;

/// Classified transformation input.
pub enum Shape {
    /// Nothing there (an empty to-one relation).
    Absent,
    /// One entity.
    Single(EntityRef),
    /// An ordered collection.
    Sequence(Vec<EntityRef>),
    /// A paginated window.
    Window(Box<dyn Windowed>),
}

impl Shape {
    pub fn window(window: impl Windowed + 'static) -> Self {
        Shape::Window(Box::new(window))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Absent => "absent",
            Shape::Single(_) => "single",
            Shape::Sequence(_) => "sequence",
            Shape::Window(_) => "window",
        }
    }

    /// Number of entities the shape holds.
    pub fn len(&self) -> usize {
        match self {
            Shape::Absent => 0,
            Shape::Single(_) => 1,
            Shape::Sequence(items) => items.len(),
            Shape::Window(window) => window.items().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Absent => f.write_str("Absent"),
            Shape::Single(entity) => f.debug_tuple("Single").field(entity).finish(),
            Shape::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Shape::Window(window) => f.debug_tuple("Window").field(&window.items()).finish(),
        }
    }
}

impl From<EntityRef> for Shape {
    fn from(entity: EntityRef) -> Self {
        Shape::Single(entity)
    }
}

impl From<Option<EntityRef>> for Shape {
    fn from(entity: Option<EntityRef>) -> Self {
        entity.map_or(Shape::Absent, Shape::Single)
    }
}

impl From<Vec<EntityRef>> for Shape {
    fn from(items: Vec<EntityRef>) -> Self {
        Shape::Sequence(items)
    }
}

impl From<Page> for Shape {
    fn from(page: Page) -> Self {
        Shape::window(page)
    }
}

/// Apply `transform_one` to every entity of `shape`, preserving its shape.
///
/// The first error aborts the whole dispatch.
pub fn dispatch<F>(shape: &Shape, mut transform_one: F) -> TransformResult<Value>
where
    F: FnMut(&dyn Entity) -> TransformResult<Mapping>,
{
    match shape {
        Shape::Absent => Ok(Value::Null),
        Shape::Single(entity) => transform_one(entity.as_ref()).map(Value::Object),
        Shape::Sequence(items) => transform_all(items, transform_one),
        Shape::Window(window) => transform_all(window.items(), transform_one),
    }
}

fn transform_all<F>(items: &[EntityRef], mut transform_one: F) -> TransformResult<Value>
where
    F: FnMut(&dyn Entity) -> TransformResult<Mapping>,
{
    items
        .iter()
        .map(|entity| transform_one(entity.as_ref()).map(Value::Object))
        .collect::<TransformResult<Vec<Value>>>()
        .map(Value::Array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use crate::error::{ResolutionError, TransformError};
    use serde_json::json;
    use std::any::Any;
    use std::sync::Arc;

    struct Row(u64);

    impl Entity for Row {
        fn entity_type(&self) -> EntityType {
            EntityType::new("row")
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "id").then(|| Value::from(self.0))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn rows(ids: &[u64]) -> Vec<EntityRef> {
        ids.iter().map(|&id| Arc::new(Row(id)) as EntityRef).collect()
    }

    fn id_only(entity: &dyn Entity) -> TransformResult<Mapping> {
        let mut out = Mapping::new();
        out.insert("id".into(), entity.attribute("id").unwrap_or(Value::Null));
        Ok(out)
    }

    #[test]
    fn test_single_is_object() {
        let shape = Shape::from(rows(&[4]).remove(0));
        assert_eq!(dispatch(&shape, id_only).unwrap(), json!({ "id": 4 }));
    }

    #[test]
    fn test_sequence_preserves_order() {
        let shape = Shape::from(rows(&[3, 1, 2]));
        assert_eq!(
            dispatch(&shape, id_only).unwrap(),
            json!([{ "id": 3 }, { "id": 1 }, { "id": 2 }])
        );
    }

    #[test]
    fn test_empty_sequence_is_empty_array() {
        let shape = Shape::from(Vec::<EntityRef>::new());
        assert_eq!(dispatch(&shape, id_only).unwrap(), json!([]));
    }

    #[test]
    fn test_absent_is_null() {
        let shape = Shape::from(None::<EntityRef>);
        assert_eq!(dispatch(&shape, id_only).unwrap(), Value::Null);
        assert!(shape.is_empty());
    }

    #[test]
    fn test_window_yields_its_items_only() {
        let page = Page::paginate(rows(&[1, 2, 3, 4, 5, 6, 7]), 2, 3);
        let shape = Shape::from(page);
        assert_eq!(shape.kind(), "window");
        assert_eq!(
            dispatch(&shape, id_only).unwrap(),
            json!([{ "id": 4 }, { "id": 5 }, { "id": 6 }])
        );
    }

    #[test]
    fn test_first_error_aborts() {
        let shape = Shape::from(rows(&[1, 2, 3]));
        let mut calls = 0;
        let result = dispatch(&shape, |entity| {
            calls += 1;
            match entity.attribute("id") {
                Some(id) if id == 2 => Err(ResolutionError::NoRegistry.into()),
                _ => id_only(entity),
            }
        });
        assert!(matches!(result, Err(TransformError::Resolution(_))));
        assert_eq!(calls, 2);
    }
}
