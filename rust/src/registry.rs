//! Name-keyed shape registry with a lazily populated descriptor cache.
//!
//! Shapes (and their optional fixture builders) are registered up front.
//! Descriptors are built on first [`ShapeRegistry::resolve`] and cached for
//! the life of the registry; concurrent first resolutions of one shape may
//! both build, but only the first insert is kept and every caller receives
//! that same `Arc`.

use dashmap::DashMap;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::descriptor::Descriptor;
use crate::error::{Error, RegistryError, Result, UnknownShapeError};
use crate::schema::Shape;
use crate::value::Instance;

/// Builds the representative instance for one shape.
pub type FixtureFn = fn(&ShapeRegistry) -> Result<Instance>;

struct ShapeEntry {
    shape: Arc<Shape>,
    fixture: Option<FixtureFn>,
}

#[derive(Default)]
pub struct ShapeRegistry {
    entries: HashMap<String, ShapeEntry>,
    order: Vec<String>,
    descriptors: DashMap<String, Arc<Descriptor>>,
}

lazy_static! {
    static ref GLOBAL: std::result::Result<ShapeRegistry, RegistryError> =
        crate::catalog::benchmark_registry();
}

/// Process-wide registry holding the benchmark catalog.
///
/// The catalog is registered on first access; a registration failure is
/// returned on every call.
pub fn global() -> Result<&'static ShapeRegistry> {
    GLOBAL.as_ref().map_err(|e| Error::from(e.clone()))
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, shape: Shape) -> std::result::Result<(), RegistryError> {
        self.insert(shape, None)
    }

    pub fn register_with_fixture(
        &mut self,
        shape: Shape,
        fixture: FixtureFn,
    ) -> std::result::Result<(), RegistryError> {
        self.insert(shape, Some(fixture))
    }

    fn insert(
        &mut self,
        shape: Shape,
        fixture: Option<FixtureFn>,
    ) -> std::result::Result<(), RegistryError> {
        shape.validate()?;
        if self.entries.contains_key(&shape.name) {
            return Err(RegistryError::DuplicateShape(shape.name));
        }
        self.order.push(shape.name.clone());
        self.entries.insert(
            shape.name.clone(),
            ShapeEntry {
                shape: Arc::new(shape),
                fixture,
            },
        );
        Ok(())
    }

    /// Shape names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn shape(&self, name: &str) -> Option<&Arc<Shape>> {
        self.entries.get(name).map(|e| &e.shape)
    }

    pub fn has_fixture(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.fixture.is_some())
    }

    /// Number of descriptors built so far.
    pub fn cached(&self) -> usize {
        self.descriptors.len()
    }

    /// Descriptor for `name`, building and caching it on first use.
    pub fn resolve(&self, name: &str) -> Result<Arc<Descriptor>> {
        let mut visiting = Vec::new();
        self.resolve_inner(name, &mut visiting)
    }

    fn resolve_inner(&self, name: &str, visiting: &mut Vec<String>) -> Result<Arc<Descriptor>> {
        let cached = self.descriptors.get(name).map(|d| Arc::clone(d.value()));
        if let Some(desc) = cached {
            return Ok(desc);
        }

        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| UnknownShapeError(name.to_string()))?;
        if visiting.iter().any(|v| v == name) {
            return Err(RegistryError::RecursiveShape(name.to_string()).into());
        }

        visiting.push(name.to_string());
        let built = Descriptor::build(Arc::clone(&entry.shape), |nested: &str| {
            self.resolve_inner(nested, visiting)
        });
        visiting.pop();
        let built = built?;

        debug!(
            shape = name,
            version = built.shape().version,
            fields = built.fields().len(),
            "built descriptor"
        );

        // no shard lock is held while building; nested resolves may touch any shard
        let canonical = self
            .descriptors
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(built));
        Ok(Arc::clone(canonical.value()))
    }

    /// Build the fixture instance for `name`.
    pub fn build(&self, name: &str) -> Result<Instance> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| UnknownShapeError(name.to_string()))?;
        let fixture = entry
            .fixture
            .ok_or_else(|| Error::from(RegistryError::NoFixture(name.to_string())))?;
        fixture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn point(_: &ShapeRegistry) -> Result<Instance> {
        Ok(Instance::new().with(1, 3).with(2, 4))
    }

    fn registry() -> ShapeRegistry {
        let mut reg = ShapeRegistry::new();
        reg.register_with_fixture(
            Shape::new("Point")
                .required(1, "x", FieldType::I32)
                .required(2, "y", FieldType::I32),
            point,
        )
        .unwrap();
        let points = FieldType::list(FieldType::strukt("Point"));
        reg.register(Shape::new("Path").optional(1, "points", points))
            .unwrap();
        reg
    }

    #[test]
    fn resolve_is_cached() {
        let reg = registry();
        let a = reg.resolve("Path").unwrap();
        let b = reg.resolve("Path").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        // nested shape was resolved along the way
        assert_eq!(reg.cached(), 2);
    }

    #[test]
    fn unknown_shape() {
        let reg = registry();
        assert_eq!(
            reg.resolve("Nope").unwrap_err(),
            Error::UnknownShape(UnknownShapeError("Nope".into()))
        );
        assert!(matches!(reg.build("Nope"), Err(Error::UnknownShape(_))));
    }

    #[test]
    fn duplicate_shape() {
        let mut reg = registry();
        assert_eq!(
            reg.register(Shape::new("Point")),
            Err(RegistryError::DuplicateShape("Point".into()))
        );
    }

    #[test]
    fn recursive_shape() {
        let mut reg = ShapeRegistry::new();
        reg.register(Shape::new("A").optional(1, "b", FieldType::strukt("B"))).unwrap();
        reg.register(Shape::new("B").optional(1, "a", FieldType::list(FieldType::strukt("A"))))
            .unwrap();
        assert_eq!(
            reg.resolve("A").unwrap_err(),
            Error::Registry(RegistryError::RecursiveShape("A".into()))
        );
        assert_eq!(reg.cached(), 0);
    }

    #[test]
    fn fixtures() {
        let reg = registry();
        assert!(reg.has_fixture("Point"));
        assert_eq!(reg.build("Point").unwrap(), Instance::new().with(1, 3).with(2, 4));
        assert_eq!(
            reg.build("Path"),
            Err(Error::Registry(RegistryError::NoFixture("Path".into())))
        );
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["Point", "Path"]);
    }

    #[test]
    fn global_holds_catalog() {
        let reg = global().unwrap();
        assert_eq!(reg.names().count(), crate::catalog::ALL.len());
        assert!(std::ptr::eq(reg, global().unwrap()));
    }
}
