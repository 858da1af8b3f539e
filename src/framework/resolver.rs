//! # Method Resolver & Cache
//!
//! Finds the adapter method an assembler uses to produce a target type.
//!
//! Resolution follows the naming convention: `to<Target>` wins, `from<Target>`
//! is the fallback, anything else is [`DtoError::MissingAssemblyMethod`].
//! Declared methods are collected once per assembler type into a
//! [`MethodTable`] registry, so resolution is a typed table lookup.
//!
//! Successful resolutions are memoized in the process-wide [`MethodCache`],
//! keyed by the (assembler, target) pair. Two threads resolving the same pair
//! for the first time both compute the same name; the last write wins.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::assembler::{Assembler, Direction, MethodTable};
use super::error::DtoError;
use super::object::TypeKey;

type TableRegistry = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static TABLES: Lazy<TableRegistry> = Lazy::new(|| RwLock::new(HashMap::new()));

static METHOD_CACHE: Lazy<MethodCache> = Lazy::new(MethodCache::default);

/// Declared methods of assembler `A`, collected on first use.
pub(crate) fn method_table<A: Assembler>() -> Arc<MethodTable<A>> {
    let id = TypeId::of::<A>();
    let existing = TABLES.read().get(&id).cloned();
    let erased = match existing {
        Some(table) => table,
        None => {
            let declared: Arc<dyn Any + Send + Sync> = Arc::new(MethodTable::<A>::declared());
            TABLES.write().entry(id).or_insert(declared).clone()
        }
    };
    erased
        .downcast::<MethodTable<A>>()
        .unwrap_or_else(|_| Arc::new(MethodTable::declared()))
}

/// Process-wide memo of resolved method names.
#[derive(Debug, Default)]
pub struct MethodCache {
    entries: RwLock<HashMap<(TypeId, TypeId), Arc<str>>>,
}

impl MethodCache {
    pub fn get(&self, assembler: TypeId, target: TypeId) -> Option<Arc<str>> {
        self.entries.read().get(&(assembler, target)).cloned()
    }

    pub fn insert(&self, assembler: TypeId, target: TypeId, method: Arc<str>) {
        self.entries.write().insert((assembler, target), method);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of targets cached for one assembler.
    pub fn entries_for(&self, assembler: TypeId) -> usize {
        self.entries.read().keys().filter(|(a, _)| *a == assembler).count()
    }
}

/// The shared cache.
pub fn method_cache() -> &'static MethodCache {
    &METHOD_CACHE
}

/// Resolves the method name without consulting the cache.
pub fn resolve<A: Assembler>(target: TypeKey) -> Result<Arc<str>, DtoError> {
    let table = method_table::<A>();
    [Direction::To, Direction::From]
        .into_iter()
        .find_map(|direction| table.lookup(direction, target.id()))
        .map(Arc::from)
        .ok_or_else(|| DtoError::MissingAssemblyMethod {
            to_method: Direction::To.method_name(target.name()),
            from_method: Direction::From.method_name(target.name()),
            target: target.name().to_string(),
            assembler: TypeKey::of::<A>().name().to_string(),
        })
}

/// Resolves the method name, memoizing successful lookups.
pub fn resolve_cached<A: Assembler>(target: TypeKey) -> Result<Arc<str>, DtoError> {
    let assembler = TypeKey::of::<A>();
    if let Some(method) = METHOD_CACHE.get(assembler.id(), target.id()) {
        trace!(assembler = %assembler, target = %target, %method, "Method cache hit");
        return Ok(method);
    }

    let method = resolve::<A>(target)?;
    debug!(assembler = %assembler, target = %target, %method, "Resolved assembly method");
    METHOD_CACHE.insert(assembler.id(), target.id(), method.clone());
    Ok(method)
}
