//! Transformation Core
//!
//! Runs one strategy on one entity, then walks the inclusion tree:
//!
//! 1. the strategy produces the base mapping;
//! 2. every inclusion that names a relation is loaded, dispatched by shape,
//!    and each related entity is transformed with the default strategy of
//!    its own type (located through the registry), recursively;
//! 3. every other inclusion is read from a getter, then from a plain
//!    attribute; names that resolve to neither become `null`, or an error
//!    in strict mode.
//!
//! Embedded values overwrite same-named keys from the strategy.

use serde_json::Value;
use tracing::{debug, trace};

use super::inclusion::InclusionTree;
use super::shape::dispatch;
use super::Mapping;
use crate::entity::Entity;
use crate::error::{TransformError, TransformResult};
use crate::registry::{Locator, Strategy};

/// Settings shared by every level of one transformation.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub locator: &'a dyn Locator,
    /// Fail on inclusion names that resolve to nothing.
    pub strict: bool,
}

impl<'a> Context<'a> {
    pub fn new(locator: &'a dyn Locator) -> Self {
        Self {
            locator,
            strict: false,
        }
    }
}

/// Transform one entity with `strategy` and embed the inclusions of `tree`.
pub fn transform_one(
    entity: &dyn Entity,
    strategy: &Strategy,
    tree: &InclusionTree,
    ctx: &Context<'_>,
) -> TransformResult<Mapping> {
    let entity_type = entity.entity_type();
    trace!(%entity_type, "applying strategy");
    let mut output = strategy.apply(entity)?;

    for (name, children) in tree.iter() {
        if let Some(related) = entity.related(name)? {
            debug!(%entity_type, relation = name, shape = related.kind(), count = related.len(), "embedding relation");
            let embedded = dispatch(&related, |child| {
                let child_type = child.entity_type();
                let child_strategy = ctx.locator.locate(child_type)?.resolve(child_type, None)?;
                transform_one(child, child_strategy, children, ctx)
            })?;
            output.insert(name.to_string(), embedded);
            continue;
        }

        if let Some(value) = entity.accessor(name) {
            if !children.is_empty() {
                debug!(%entity_type, getter = name, ignored = %children, "nested inclusions under a getter are ignored");
            }
            output.insert(name.to_string(), value);
            continue;
        }

        match entity.attribute(name) {
            Some(value) => {
                output.insert(name.to_string(), value);
            }
            None if ctx.strict => {
                return Err(TransformError::UnknownInclusion {
                    entity_type,
                    name: name.to_string(),
                });
            }
            None => {
                debug!(%entity_type, name, "inclusion resolved to nothing");
                output.entry(name.to_string()).or_insert(Value::Null);
            }
        }
    }

    Ok(output)
}
