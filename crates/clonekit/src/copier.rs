//! Compiled field copiers and the copier cache
//!
//! A `Copier` fuses the per-field steps of one concrete type into a single
//! procedure over untyped references, downcasting each side once. The
//! `CopierCache` memoizes copiers by `TypeId`; the lookup, the compile on a
//! miss and the insert all happen under one lock, so a type is compiled at
//! most once per cache.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{CloneError, CloneResult};
use crate::fields::DeclaredFields;

type ErasedCopy = Box<dyn Fn(&dyn Any, &mut dyn Any) -> CloneResult<()> + Send + Sync>;

// ============================================================================
// Copier
// ============================================================================

/// Field-by-field copy procedure specialized for one type
pub struct Copier {
    type_id: TypeId,
    type_name: &'static str,
    field_count: usize,
    run: ErasedCopy,
}

impl Copier {
    /// Build the copier for `T` from its declared fields
    pub fn compile<T: DeclaredFields>() -> Self {
        let steps: Vec<_> = T::declared_fields()
            .into_iter()
            .map(|field| field.step())
            .collect();
        let field_count = steps.len();
        let type_name = std::any::type_name::<T>();

        let run: ErasedCopy = Box::new(move |from: &dyn Any, to: &mut dyn Any| {
            let from = from
                .downcast_ref::<T>()
                .ok_or(CloneError::CopierMismatch { expected: type_name })?;
            let to = to
                .downcast_mut::<T>()
                .ok_or(CloneError::CopierMismatch { expected: type_name })?;
            for step in &steps {
                step(from, to);
            }
            Ok(())
        });

        Copier {
            type_id: TypeId::of::<T>(),
            type_name,
            field_count,
            run,
        }
    }

    /// Copy all declared fields from `from` into `to`.
    ///
    /// Both must be the type this copier was compiled for.
    pub fn copy(&self, from: &dyn Any, to: &mut dyn Any) -> CloneResult<()> {
        (self.run)(from, to)
    }

    /// `TypeId` of the target type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the target type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of fields assigned per copy
    pub fn field_count(&self) -> usize {
        self.field_count
    }
}

impl fmt::Debug for Copier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Copier")
            .field("type_name", &self.type_name)
            .field("field_count", &self.field_count)
            .finish()
    }
}

// ============================================================================
// Cache statistics
// ============================================================================

/// Point-in-time copy of a cache's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to compile
    pub misses: u64,
    /// Copiers compiled and stored
    pub compiled: u64,
}

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    compiled: AtomicU64,
}

impl CacheStats {
    fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compiled: self.compiled.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// CopierCache
// ============================================================================

static GLOBAL_COPIERS: LazyLock<CopierCache> = LazyLock::new(CopierCache::new);

/// Type-keyed memo of compiled copiers.
///
/// Entries are never evicted. Every access takes the same lock.
#[derive(Default)]
pub struct CopierCache {
    copiers: Mutex<FxHashMap<TypeId, Arc<Copier>>>,
    stats: CacheStats,
}

impl CopierCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by the free cloning functions
    pub fn global() -> &'static CopierCache {
        &GLOBAL_COPIERS
    }

    /// Get the copier for `T`, compiling and storing it on first use
    pub fn get_or_compile<T: DeclaredFields>(&self) -> Arc<Copier> {
        let key = TypeId::of::<T>();
        let mut copiers = self.copiers.lock();

        if let Some(copier) = copiers.get(&key) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            trace!(type_name = copier.type_name(), "copier cache hit");
            return Arc::clone(copier);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let copier = Arc::new(Copier::compile::<T>());
        debug!(
            type_name = copier.type_name(),
            fields = copier.field_count(),
            "compiled field copier"
        );
        copiers.insert(key, Arc::clone(&copier));
        self.stats.compiled.fetch_add(1, Ordering::Relaxed);
        copier
    }

    /// Check if a copier for `T` has been compiled
    pub fn contains<T: 'static>(&self) -> bool {
        self.copiers.lock().contains_key(&TypeId::of::<T>())
    }

    /// Number of cached copiers
    pub fn len(&self) -> usize {
        self.copiers.lock().len()
    }

    /// Check if no copier has been compiled yet
    pub fn is_empty(&self) -> bool {
        self.copiers.lock().is_empty()
    }

    /// Current hit/miss/compile counters
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Copy every declared field of `source` into `destination`
    pub fn clone_fields_into<'d, T: DeclaredFields>(
        &self,
        source: &T,
        destination: &'d mut T,
    ) -> CloneResult<&'d mut T> {
        let copier = self.get_or_compile::<T>();
        copier.copy(source, &mut *destination)?;
        Ok(destination)
    }

    /// Copy every declared field of `source` into a fresh `T::default()`
    pub fn clone_fields<T: DeclaredFields + Default>(&self, source: &T) -> CloneResult<T> {
        let mut destination = T::default();
        self.clone_fields_into(source, &mut destination)?;
        Ok(destination)
    }
}

impl fmt::Debug for CopierCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopierCache")
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
