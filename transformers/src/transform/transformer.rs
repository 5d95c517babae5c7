//! Transformer - the configured entry point.
//!
//! A [`Transformer`] is bound to one entity type. It is configured by
//! consuming builder calls and then used through `&self`, so one value can
//! serve a whole request without shared mutable state.
//!
//! ```rust,ignore
//! let users = Transformer::for_entity::<User>(&registry)?
//!     .set_transformation("admin")?
//!     .with(["posts.tags", "isOfAge"]);
//!
//! let body = users.transform(store.users())?;
//! ```

use serde_json::Value;
use tracing::debug_span;

use super::engine::{transform_one, Context};
use super::inclusion::InclusionTree;
use super::shape::{dispatch, Shape};
use super::Mapping;
use crate::entity::{Entity, EntityType, TypedEntity};
use crate::error::TransformResult;
use crate::registry::{Locator, Strategy};

/// Which strategy a transformer runs.
#[derive(Debug, Clone)]
enum Selection {
    Named(String),
    Inline,
}

/// A transformation configured for one entity type.
#[derive(Clone)]
pub struct Transformer<'r> {
    locator: &'r dyn Locator,
    entity_type: EntityType,
    selection: Selection,
    strategy: Strategy,
    inclusions: InclusionTree,
    strict: bool,
}

impl<'r> Transformer<'r> {
    /// Transformer for `entity_type` using its default strategy.
    pub fn new(locator: &'r dyn Locator, entity_type: EntityType) -> TransformResult<Self> {
        let strategies = locator.locate(entity_type)?;
        let strategy = strategies.resolve(entity_type, None)?.clone();
        Ok(Self {
            locator,
            entity_type,
            selection: Selection::Named(strategies.default_key().to_string()),
            strategy,
            inclusions: InclusionTree::new(),
            strict: false,
        })
    }

    pub fn for_entity<T: TypedEntity>(locator: &'r dyn Locator) -> TransformResult<Self> {
        Self::new(locator, T::TYPE)
    }

    /// Add inclusion paths. Repeated calls accumulate.
    pub fn with<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.inclusions.insert(path.as_ref());
        }
        self
    }

    /// Add an already parsed inclusion tree.
    pub fn with_tree(mut self, tree: &InclusionTree) -> Self {
        self.inclusions.merge(tree);
        self
    }

    /// Select a registered strategy by key.
    ///
    /// Fails immediately with `UnknownStrategy` when the key is not
    /// registered for this transformer's type.
    pub fn set_transformation(mut self, key: &str) -> TransformResult<Self> {
        self.strategy = self
            .locator
            .locate(self.entity_type)?
            .resolve(self.entity_type, Some(key))?
            .clone();
        self.selection = Selection::Named(key.to_string());
        Ok(self)
    }

    /// Use an inline strategy, bypassing the registry.
    pub fn set_callable<F>(self, f: F) -> Self
    where
        F: Fn(&dyn Entity) -> TransformResult<Mapping> + Send + Sync + 'static,
    {
        self.set_strategy(Strategy::new(f))
    }

    /// Use an already built strategy, bypassing the registry.
    pub fn set_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self.selection = Selection::Inline;
        self
    }

    /// Make inclusion names that resolve to nothing an error.
    pub fn strict_inclusions(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Selected strategy key; `None` for an inline strategy.
    pub fn strategy_name(&self) -> Option<&str> {
        match &self.selection {
            Selection::Named(key) => Some(key.as_str()),
            Selection::Inline => None,
        }
    }

    pub fn inclusions(&self) -> &InclusionTree {
        &self.inclusions
    }

    /// Transform a single entity, collection or window.
    pub fn transform(&self, input: impl Into<Shape>) -> TransformResult<Value> {
        self.transform_shape(&input.into())
    }

    pub fn transform_shape(&self, shape: &Shape) -> TransformResult<Value> {
        let span = debug_span!(
            "transform",
            entity_type = %self.entity_type,
            strategy = self.strategy_name().unwrap_or("<inline>"),
            include = %self.inclusions,
            shape = shape.kind(),
        );
        let _enter = span.enter();

        let ctx = Context {
            locator: self.locator,
            strict: self.strict,
        };
        dispatch(shape, |entity| {
            transform_one(entity, &self.strategy, &self.inclusions, &ctx)
        })
    }
}

/// Transform `input` with each entity's own default strategy.
///
/// Useful when the input mixes types or the caller has no transformer at
/// hand.
pub fn transform<I, S>(locator: &dyn Locator, input: impl Into<Shape>, paths: I) -> TransformResult<Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tree = InclusionTree::parse(paths);
    let ctx = Context::new(locator);
    dispatch(&input.into(), |entity| {
        let entity_type = entity.entity_type();
        let strategy = locator.locate(entity_type)?.resolve(entity_type, None)?;
        transform_one(entity, strategy, &tree, &ctx)
    })
}
