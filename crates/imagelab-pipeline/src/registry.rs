//! Operator factory: maps operation kinds to constructors.
//!
//! Adding an operation means registering a constructor, not extending a
//! `match`. [`Registry::builtin`] registers every built-in operator for
//! [`DynamicImage`]; [`Registry::empty`] starts from nothing so callers
//! can wire their own operators (for other image types, or test doubles).

use std::collections::BTreeMap;
use std::fmt;

use crate::operation::OperationKind;
use crate::operator::{Block, Operator};
use crate::operators;
use crate::types::DynamicImage;

type Constructor<I> = Box<dyn Fn() -> Box<dyn Operator<I>>>;

/// The set of operations a controller can instantiate.
pub struct Registry<I> {
    constructors: BTreeMap<OperationKind, Constructor<I>>,
}

impl<I> Registry<I> {
    /// A registry with no operations.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register (or replace) the constructor for `kind`.
    pub fn register<F>(&mut self, kind: OperationKind, constructor: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Operator<I>> + 'static,
    {
        self.constructors.insert(kind, Box::new(constructor));
        self
    }

    /// Whether `kind` can be instantiated.
    #[must_use]
    pub fn contains(&self, kind: OperationKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    /// Registered kinds, in [`OperationKind`] order.
    pub fn kinds(&self) -> impl Iterator<Item = OperationKind> + '_ {
        self.constructors.keys().copied()
    }

    /// Build a fresh block for `kind`, or `None` if it is not registered.
    #[must_use]
    pub fn create(&self, kind: OperationKind) -> Option<Block<I>> {
        self.constructors
            .get(&kind)
            .map(|constructor| Block::new(kind, constructor()))
    }
}

impl Registry<DynamicImage> {
    /// Every built-in operator.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (kind, definition) in operators::definitions() {
            registry.register(kind, move || Box::new(definition.instantiate()));
        }
        registry
    }
}

impl Default for Registry<DynamicImage> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<I> fmt::Debug for Registry<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::Label;

    #[test]
    fn builtin_registers_every_kind() {
        let registry = Registry::builtin();
        assert_eq!(registry.kinds().collect::<Vec<_>>(), OperationKind::ALL);
    }

    #[test]
    fn create_tags_block_with_kind() {
        let registry = Registry::builtin();
        let block = registry.create(OperationKind::MedianBlur).unwrap();
        assert_eq!(block.kind(), OperationKind::MedianBlur);
    }

    #[test]
    fn create_returns_fresh_instances() {
        let registry = Registry::builtin();
        let mut first = registry.create(OperationKind::GaussianBlur).unwrap();
        first.set_param("sigma", 4.0.into()).unwrap();
        let second = registry.create(OperationKind::GaussianBlur).unwrap();
        assert_ne!(first.params(), second.params());
    }

    #[test]
    fn empty_registry_creates_nothing() {
        let registry: Registry<Vec<String>> = Registry::empty();
        assert!(registry.create(OperationKind::ReadImage).is_none());
        assert!(!registry.contains(OperationKind::ReadImage));
    }

    #[test]
    fn custom_registration() {
        let mut registry: Registry<Vec<String>> = Registry::empty();
        registry.register(OperationKind::Blur, || Box::new(Label::new("blur")));
        assert!(registry.contains(OperationKind::Blur));
        assert!(registry.create(OperationKind::Erosion).is_none());
        let block = registry.create(OperationKind::Blur).unwrap();
        assert_eq!(block.compute(&Vec::new()).unwrap().unwrap(), ["blur"]);
    }
}
