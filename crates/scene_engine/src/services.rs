//! Opaque service/context handle shared across the engine.
//!
//! The dispatcher is constructed with a [`Services`] handle and forwards it
//! unchanged to every system factory it invokes, so systems can resolve their
//! own collaborators (draw sinks, renderer handles, and so on) without the
//! dispatcher knowing their shape.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Cloneable, thread-safe type-map of shared engine services.
///
/// Each service is keyed by its concrete type; at most one instance of a
/// given type is registered at a time.
#[derive(Clone, Default)]
pub struct Services {
    inner: Arc<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl Services {
    /// Create an empty service map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service instance, replacing any previous instance of the
    /// same type
    pub fn insert<T: Any + Send + Sync>(&self, service: T) {
        self.insert_arc(Arc::new(service));
    }

    /// Register an already-shared service instance
    pub fn insert_arc<T: Any + Send + Sync>(&self, service: Arc<T>) {
        log::debug!("registering service {}", type_name::<T>());
        self.inner
            .write()
            .unwrap()
            .insert(TypeId::of::<T>(), service);
    }

    /// Resolve a service by type
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner
            .read()
            .unwrap()
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    /// Whether a service of the given type is registered
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.inner.read().unwrap().contains_key(&TypeId::of::<T>())
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.inner.read().unwrap().len();
        f.debug_struct("Services").field("len", &len).finish()
    }
}
