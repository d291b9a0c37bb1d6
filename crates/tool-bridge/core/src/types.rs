//! Registry of synthesized object types.

use crate::descriptor::ObjectType;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Records every object type a [`SchemaCompiler`](crate::SchemaCompiler)
/// synthesizes.
///
/// With deduplication enabled, structurally identical types (equal
/// [`ObjectType::signature`]) share one `Arc`. Without it every registration
/// is kept and lookups return the first type with a signature.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    dedup: bool,
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    types: Vec<Arc<ObjectType>>,
    by_signature: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dedup(dedup: bool) -> Self {
        Self {
            dedup,
            inner: RwLock::default(),
        }
    }

    pub fn dedup_enabled(&self) -> bool {
        self.dedup
    }

    /// Record a type and return the shared handle to use for it.
    pub fn register(&self, ty: ObjectType) -> Arc<ObjectType> {
        let signature = ty.signature();
        let mut inner = self.write();
        if self.dedup {
            if let Some(&idx) = inner.by_signature.get(&signature) {
                return Arc::clone(&inner.types[idx]);
            }
        }
        let idx = inner.types.len();
        let ty = Arc::new(ty);
        inner.types.push(Arc::clone(&ty));
        inner.by_signature.entry(signature).or_insert(idx);
        ty
    }

    /// First registered type with the given signature.
    pub fn lookup(&self, signature: &str) -> Option<Arc<ObjectType>> {
        let inner = self.read();
        inner
            .by_signature
            .get(signature)
            .map(|&idx| Arc::clone(&inner.types[idx]))
    }

    /// Snapshot of all registered types in registration order.
    pub fn types(&self) -> Vec<Arc<ObjectType>> {
        self.read().types.clone()
    }

    pub fn len(&self) -> usize {
        self.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registered type.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.types.clear();
        inner.by_signature.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
