//! Process-wide registry of resolved field accessors.
//!
//! Two-level map: entity `TypeId` → normalized field name → accessor. Entries
//! are never evicted. Builders run without any shard lock held, so a race on
//! the same key may build twice; the first stored value wins and all builders
//! for a key are required to be equivalent.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::field::{normalize_field_name, FieldAccessor};

type Erased = Arc<dyn Any + Send + Sync>;

static GLOBAL: Lazy<AccessorCache> = Lazy::new(AccessorCache::new);

#[derive(Default)]
pub struct AccessorCache {
    types: DashMap<TypeId, Arc<DashMap<String, Erased>>>,
}

impl std::fmt::Debug for AccessorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessorCache")
            .field("types", &self.types.len())
            .field("entries", &self.len())
            .finish()
    }
}

impl AccessorCache {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static AccessorCache {
        &GLOBAL
    }

    fn fields_of<T: 'static>(&self) -> Arc<DashMap<String, Erased>> {
        if let Some(inner) = self.types.get(&TypeId::of::<T>()) {
            return Arc::clone(inner.value());
        }
        Arc::clone(
            self.types
                .entry(TypeId::of::<T>())
                .or_insert_with(|| Arc::new(DashMap::new()))
                .value(),
        )
    }

    /// Look up a cached accessor without building one.
    pub fn get<T>(&self, field: &str) -> Option<FieldAccessor<T>>
    where
        T: Send + Sync + 'static,
    {
        let key = normalize_field_name(field);
        let inner = self.types.get(&TypeId::of::<T>())?;
        let erased = inner.get(&key)?;
        erased.value().downcast_ref::<FieldAccessor<T>>().cloned()
    }

    pub fn contains<T>(&self, field: &str) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.get::<T>(field).is_some()
    }

    pub fn get_or_build<T, F>(&self, field: &str, build: F) -> FieldAccessor<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> FieldAccessor<T>,
    {
        match self.get_or_try_build::<T, _, std::convert::Infallible>(field, || Ok(build())) {
            Ok(acc) => acc,
            Err(never) => match never {},
        }
    }

    /// Return the cached accessor for `field` or build, store and return one.
    ///
    /// A failed build stores nothing.
    pub fn get_or_try_build<T, F, E>(&self, field: &str, build: F) -> Result<FieldAccessor<T>, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<FieldAccessor<T>, E>,
    {
        let key = normalize_field_name(field);
        let fields = self.fields_of::<T>();

        if let Some(hit) = fields
            .get(&key)
            .and_then(|e| e.value().downcast_ref::<FieldAccessor<T>>().cloned())
        {
            return Ok(hit);
        }

        // No guard is alive here; the builder may take as long as it needs.
        let built = build()?;
        debug!(
            entity = std::any::type_name::<T>(),
            field = %key,
            "built field accessor"
        );

        let stored = fields
            .entry(key)
            .or_insert_with(|| Arc::new(built.clone()) as Erased);
        Ok(stored
            .value()
            .downcast_ref::<FieldAccessor<T>>()
            .cloned()
            .unwrap_or(built))
    }

    /// Total number of cached accessors across all types.
    pub fn len(&self) -> usize {
        self.types.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
