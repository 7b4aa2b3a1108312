//! Path-keyed content cache with typed loaders.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crossbeam_channel::{bounded, Receiver};
use log::{debug, info};

/// Content management errors
#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    /// No loader registered for the requested asset type
    #[error("no loader registered for asset type {0}")]
    NoLoader(&'static str),

    /// The cached asset at this path has a different type
    #[error("asset at `{path}` is a {actual}, not a {requested}")]
    TypeMismatch {
        /// Path of the cached asset
        path: String,
        /// Type name of the cached asset
        actual: &'static str,
        /// Type name the caller asked for
        requested: &'static str,
    },

    /// Unload of a path that holds no loaded asset
    #[error("no asset loaded at `{0}`")]
    NotLoaded(String),

    /// The loader failed to produce the asset
    #[error("failed to load `{path}`: {reason}")]
    LoadFailed {
        /// Path of the asset that failed
        path: String,
        /// Loader-provided failure description
        reason: String,
    },

    /// An asynchronous load worker terminated without reporting a result
    #[error("asset load worker terminated without a result")]
    WorkerLost,
}

/// Producer of assets of type `T` from content paths.
///
/// Paths are opaque to the manager; a loader may read the filesystem, hit a
/// pack file, or synthesize the asset procedurally.
pub trait AssetLoader<T>: Send + Sync {
    /// Produce the asset stored at `path`.
    fn load(&self, path: &str) -> Result<T, ContentError>;
}

impl<T, F> AssetLoader<T> for F
where
    F: Fn(&str) -> Result<T, ContentError> + Send + Sync,
{
    fn load(&self, path: &str) -> Result<T, ContentError> {
        self(path)
    }
}

struct LoaderSlot<T> {
    loader: Box<dyn AssetLoader<T>>,
}

struct CacheEntry {
    type_id: TypeId,
    type_name: &'static str,
    asset: Arc<dyn Any + Send + Sync>,
    refs: usize,
}

/// Path-keyed, reference-counted asset cache.
///
/// Each `load` of a path bumps its reference count and each `unload` drops
/// it; the asset leaves the cache when the count reaches zero. Handles
/// already given out stay valid after eviction, they simply no longer share
/// with future loads. Cloning the manager shares the cache and loader set.
#[derive(Clone)]
pub struct ContentManager {
    inner: Arc<ContentInner>,
}

struct ContentInner {
    loaders: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for ContentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentManager {
    /// Create an empty manager with no loaders registered.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContentInner {
                loaders: RwLock::new(HashMap::new()),
                cache: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register the loader used for assets of type `T`, replacing any
    /// previous one.
    pub fn register_loader<T, L>(&self, loader: L)
    where
        T: Send + Sync + 'static,
        L: AssetLoader<T> + 'static,
    {
        info!("registered loader for {}", type_name::<T>());
        self.inner.loaders.write().unwrap().insert(
            TypeId::of::<T>(),
            Arc::new(LoaderSlot::<T> {
                loader: Box::new(loader),
            }),
        );
    }

    fn loader_for<T: Send + Sync + 'static>(&self) -> Result<Arc<LoaderSlot<T>>, ContentError> {
        self.inner
            .loaders
            .read()
            .unwrap()
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or(ContentError::NoLoader(type_name::<T>()))?
            .downcast::<LoaderSlot<T>>()
            .map_err(|_| ContentError::NoLoader(type_name::<T>()))
    }

    /// Load the asset at `path` as a `T`, sharing the cached instance when
    /// the path is already loaded.
    pub fn load<T: Send + Sync + 'static>(&self, path: &str) -> Result<Arc<T>, ContentError> {
        if let Some(asset) = self.share_cached::<T>(path)? {
            return Ok(asset);
        }

        // Cache miss. The loader runs without the cache lock held, so slow
        // loads do not stall unrelated lookups; a racing load of the same
        // path is resolved in favor of whichever entry landed first.
        let slot = self.loader_for::<T>()?;
        let asset = Arc::new(slot.loader.load(path)?);

        let mut cache = self.inner.cache.lock().unwrap();
        if cache.contains_key(path) {
            drop(cache);
            return Ok(self.share_cached::<T>(path)?.unwrap_or(asset));
        }
        debug!("cached {} at `{path}`", type_name::<T>());
        cache.insert(
            path.to_string(),
            CacheEntry {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                asset: asset.clone(),
                refs: 1,
            },
        );
        Ok(asset)
    }

    /// Bump and return the cached asset at `path`, or `Ok(None)` on a miss.
    fn share_cached<T: Send + Sync + 'static>(
        &self,
        path: &str,
    ) -> Result<Option<Arc<T>>, ContentError> {
        let mut cache = self.inner.cache.lock().unwrap();
        let Some(entry) = cache.get_mut(path) else {
            return Ok(None);
        };
        if entry.type_id != TypeId::of::<T>() {
            return Err(ContentError::TypeMismatch {
                path: path.to_string(),
                actual: entry.type_name,
                requested: type_name::<T>(),
            });
        }
        entry.refs += 1;
        let asset = entry
            .asset
            .clone()
            .downcast::<T>()
            .map_err(|_| ContentError::TypeMismatch {
                path: path.to_string(),
                actual: entry.type_name,
                requested: type_name::<T>(),
            })?;
        Ok(Some(asset))
    }

    /// Load the asset at `path` on a background worker.
    ///
    /// The worker shares this manager's cache; await the result through the
    /// returned handle.
    pub fn load_async<T: Send + Sync + 'static>(&self, path: &str) -> LoadHandle<T> {
        let (sender, receiver) = bounded(1);
        let manager = self.clone();
        let path = path.to_string();
        std::thread::spawn(move || {
            let result = manager.load::<T>(&path);
            // The handle may already be dropped; nothing to do then.
            let _ = sender.send(result);
        });
        LoadHandle { receiver }
    }

    /// Drop one reference to the asset at `path`, evicting it from the cache
    /// when no references remain.
    pub fn unload(&self, path: &str) -> Result<(), ContentError> {
        let mut cache = self.inner.cache.lock().unwrap();
        let Some(entry) = cache.get_mut(path) else {
            return Err(ContentError::NotLoaded(path.to_string()));
        };
        entry.refs -= 1;
        if entry.refs == 0 {
            debug!("evicted `{path}`");
            cache.remove(path);
        }
        Ok(())
    }

    /// Whether an asset is currently cached at `path`.
    pub fn is_loaded(&self, path: &str) -> bool {
        self.inner.cache.lock().unwrap().contains_key(path)
    }

    /// Current reference count of the asset at `path`, if loaded.
    pub fn ref_count(&self, path: &str) -> Option<usize> {
        self.inner
            .cache
            .lock()
            .unwrap()
            .get(path)
            .map(|entry| entry.refs)
    }
}

impl std::fmt::Debug for ContentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentManager")
            .field("cached", &self.inner.cache.lock().unwrap().len())
            .finish()
    }
}

/// Pending result of [`ContentManager::load_async`].
pub struct LoadHandle<T> {
    receiver: Receiver<Result<Arc<T>, ContentError>>,
}

impl<T> LoadHandle<T> {
    /// Block until the load completes.
    pub fn wait(self) -> Result<Arc<T>, ContentError> {
        self.receiver.recv().map_err(|_| ContentError::WorkerLost)?
    }

    /// The result if the load has completed, `None` while it is still
    /// running.
    pub fn try_wait(&self) -> Option<Result<Arc<T>, ContentError>> {
        self.receiver.try_recv().ok()
    }
}
