//! Strategy Registry - named transformation strategies per entity type
//!
//! Each entity type owns a set of strategies keyed by name plus a default key
//! (`"default"` unless changed). The registry is filled at startup and read
//! afterwards; it can be published process-wide with [`install`].
//!
//! ```rust,ignore
//! let mut registry = StrategyRegistry::new();
//! registry
//!     .register_typed::<User, _>(DEFAULT_KEY, |user| user_fields(user))
//!     .register_typed::<User, _>("admin", |user| admin_fields(user));
//! registry.validate()?;
//! ```

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::entity::{Entity, EntityType, TypedEntity};
use crate::error::{RegistryError, RegistryResult, ResolutionError, TransformError, TransformResult};
use crate::transform::Mapping;

/// Key of the strategy used when none is selected
pub const DEFAULT_KEY: &str = "default";

type StrategyFn = dyn Fn(&dyn Entity) -> TransformResult<Mapping> + Send + Sync;

/// A transformation strategy: entity in, output mapping out.
#[derive(Clone)]
pub struct Strategy {
    inner: Arc<StrategyFn>,
}

impl Strategy {
    /// Wrap a strategy that works on any entity.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn Entity) -> TransformResult<Mapping> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap a strategy written against a concrete entity type.
    ///
    /// Entities of any other type are rejected with
    /// [`TransformError::TypeMismatch`].
    pub fn typed<T, F>(f: F) -> Self
    where
        T: TypedEntity,
        F: Fn(&T) -> Mapping + Send + Sync + 'static,
    {
        Self::new(move |entity| {
            let typed = entity
                .as_any()
                .downcast_ref::<T>()
                .ok_or_else(|| TransformError::TypeMismatch {
                    expected: T::TYPE,
                    found: entity.entity_type(),
                })?;
            Ok(f(typed))
        })
    }

    pub fn apply(&self, entity: &dyn Entity) -> TransformResult<Mapping> {
        (self.inner)(entity)
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Strategy(..)")
    }
}

/// The strategies registered for one entity type.
#[derive(Debug, Clone)]
pub struct TypeStrategies {
    default_key: String,
    strategies: HashMap<String, Strategy>,
}

impl TypeStrategies {
    fn new() -> Self {
        Self {
            default_key: DEFAULT_KEY.to_string(),
            strategies: HashMap::new(),
        }
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn get(&self, key: &str) -> Option<&Strategy> {
        self.strategies.get(key)
    }

    /// Look up `key`, or the default key when `None`.
    pub fn resolve(&self, entity_type: EntityType, key: Option<&str>) -> TransformResult<&Strategy> {
        let key = key.unwrap_or(self.default_key.as_str());
        self.strategies
            .get(key)
            .ok_or_else(|| TransformError::UnknownStrategy {
                entity_type,
                key: key.to_string(),
            })
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Resolves the transformer registered for an entity type.
pub trait Locator: Send + Sync {
    fn locate(&self, entity_type: EntityType) -> Result<&TypeStrategies, ResolutionError>;
}

/// Registry of strategies for every transformable entity type.
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    types: HashMap<EntityType, TypeStrategies>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `strategy` under `key`. Re-registering a key replaces it.
    pub fn register(
        &mut self,
        entity_type: EntityType,
        key: impl Into<String>,
        strategy: Strategy,
    ) -> &mut Self {
        let key = key.into();
        let entry = self.types.entry(entity_type).or_insert_with(TypeStrategies::new);
        if entry.strategies.insert(key.clone(), strategy).is_some() {
            warn!(%entity_type, %key, "strategy replaced by a later registration");
        }
        self
    }

    /// Register a strategy written against a concrete entity type.
    pub fn register_typed<T, F>(&mut self, key: impl Into<String>, f: F) -> &mut Self
    where
        T: TypedEntity,
        F: Fn(&T) -> Mapping + Send + Sync + 'static,
    {
        self.register(T::TYPE, key, Strategy::typed::<T, F>(f))
    }

    /// Make `key` the default strategy of `entity_type`.
    pub fn set_default(&mut self, entity_type: EntityType, key: &str) -> RegistryResult<&mut Self> {
        let entry = self
            .types
            .get_mut(&entity_type)
            .filter(|entry| entry.strategies.contains_key(key))
            .ok_or_else(|| RegistryError::UnknownStrategy {
                entity_type,
                key: key.to_string(),
            })?;
        entry.default_key = key.to_string();
        Ok(self)
    }

    /// Resolve a strategy by key, or the type's default when `None`.
    pub fn resolve(&self, entity_type: EntityType, key: Option<&str>) -> TransformResult<&Strategy> {
        self.locate(entity_type)?.resolve(entity_type, key)
    }

    pub fn contains(&self, entity_type: EntityType) -> bool {
        self.types.contains_key(&entity_type)
    }

    /// Registered entity types, sorted.
    pub fn entity_types(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self.types.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Registered keys of one type, sorted; empty for unknown types.
    pub fn strategy_keys(&self, entity_type: EntityType) -> Vec<&str> {
        self.types
            .get(&entity_type)
            .map(TypeStrategies::keys)
            .unwrap_or_default()
    }

    /// Check that every type has a resolvable default.
    pub fn validate(&self) -> RegistryResult<()> {
        for entity_type in self.entity_types() {
            let entry = &self.types[&entity_type];
            if entry.get(&entry.default_key).is_none() {
                return Err(RegistryError::MissingDefault {
                    entity_type,
                    key: entry.default_key.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Locator for StrategyRegistry {
    fn locate(&self, entity_type: EntityType) -> Result<&TypeStrategies, ResolutionError> {
        self.types
            .get(&entity_type)
            .ok_or(ResolutionError::Unregistered(entity_type))
    }
}

// =============================================================================
// Process-wide registry
// =============================================================================

static GLOBAL: OnceCell<StrategyRegistry> = OnceCell::new();

/// Validate `registry` and publish it for the rest of the process.
pub fn install(registry: StrategyRegistry) -> RegistryResult<&'static StrategyRegistry> {
    registry.validate()?;
    GLOBAL
        .try_insert(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)
}

/// The registry published by [`install`].
pub fn global() -> Result<&'static StrategyRegistry, ResolutionError> {
    GLOBAL.get().ok_or(ResolutionError::NoRegistry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::any::Any;

    struct Widget {
        label: &'static str,
    }

    impl Entity for Widget {
        fn entity_type(&self) -> EntityType {
            Self::TYPE
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "label").then(|| Value::from(self.label))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl TypedEntity for Widget {
        const TYPE: EntityType = EntityType::new("widget");
    }

    struct Gadget;

    impl Entity for Gadget {
        fn entity_type(&self) -> EntityType {
            EntityType::new("gadget")
        }

        fn attribute(&self, _name: &str) -> Option<Value> {
            None
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn constant(key: &str, value: &str) -> Strategy {
        let (key, value) = (key.to_string(), value.to_string());
        Strategy::new(move |_| {
            let mut out = Mapping::new();
            out.insert(key.clone(), Value::from(value.clone()));
            Ok(out)
        })
    }

    fn registry() -> StrategyRegistry {
        let mut registry = StrategyRegistry::new();
        registry
            .register(Widget::TYPE, DEFAULT_KEY, constant("v", "default"))
            .register(Widget::TYPE, "compact", constant("v", "compact"));
        registry
    }

    #[test]
    fn test_resolve_default_and_named() {
        let registry = registry();
        let widget = Widget { label: "w" };

        let default = registry.resolve(Widget::TYPE, None).unwrap();
        assert_eq!(default.apply(&widget).unwrap()["v"], "default");

        let compact = registry.resolve(Widget::TYPE, Some("compact")).unwrap();
        assert_eq!(compact.apply(&widget).unwrap()["v"], "compact");
    }

    #[test]
    fn test_unknown_key_is_unknown_strategy() {
        let err = registry().resolve(Widget::TYPE, Some("public")).unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnknownStrategy { ref key, .. } if key == "public"
        ));
    }

    #[test]
    fn test_unregistered_type_is_resolution_error() {
        let err = registry().resolve(EntityType::new("gadget"), None).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Resolution(ResolutionError::Unregistered(_))
        ));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = registry();
        registry.register(Widget::TYPE, "compact", constant("v", "replaced"));

        let widget = Widget { label: "w" };
        let compact = registry.resolve(Widget::TYPE, Some("compact")).unwrap();
        assert_eq!(compact.apply(&widget).unwrap()["v"], "replaced");
        assert_eq!(registry.strategy_keys(Widget::TYPE), vec!["compact", "default"]);
    }

    #[test]
    fn test_set_default() {
        let mut registry = registry();
        registry.set_default(Widget::TYPE, "compact").unwrap();

        let widget = Widget { label: "w" };
        let default = registry.resolve(Widget::TYPE, None).unwrap();
        assert_eq!(default.apply(&widget).unwrap()["v"], "compact");
        assert_eq!(registry.locate(Widget::TYPE).unwrap().default_key(), "compact");

        assert!(matches!(
            registry.set_default(Widget::TYPE, "missing"),
            Err(RegistryError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn test_validate_requires_default() {
        let mut registry = StrategyRegistry::new();
        registry.register(Widget::TYPE, "compact", constant("v", "compact"));
        assert!(matches!(
            registry.validate(),
            Err(RegistryError::MissingDefault { ref key, .. }) if key == DEFAULT_KEY
        ));

        registry.set_default(Widget::TYPE, "compact").unwrap();
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_typed_strategy_rejects_other_types() {
        let strategy = Strategy::typed::<Widget, _>(|widget| {
            let mut out = Mapping::new();
            out.insert("label".into(), Value::from(widget.label));
            out
        });

        let out = strategy.apply(&Widget { label: "dial" }).unwrap();
        assert_eq!(out["label"], "dial");

        let err = strategy.apply(&Gadget).unwrap_err();
        assert!(matches!(
            err,
            TransformError::TypeMismatch { expected, found }
                if expected == Widget::TYPE && found == EntityType::new("gadget")
        ));
    }

    #[test]
    fn test_install_once() {
        let installed = install(registry()).unwrap();
        assert!(installed.contains(Widget::TYPE));
        assert!(global().unwrap().contains(Widget::TYPE));
        assert!(matches!(install(registry()), Err(RegistryError::AlreadyInstalled)));
    }
}
