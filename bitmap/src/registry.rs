use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::collections::HashMap;
use crate::error::{BitmapError, Result};
use crate::{Bitmap, Roaring, ShardedBitset};

/// Engine name of [`ShardedBitset`].
pub const ENGINE_BITSET: &str = "bitset";

/// Engine name of [`Roaring`].
pub const ENGINE_ROARING: &str = "roaring";

/// Builds a fresh bitmap instance.
pub type Constructor = Arc<dyn Fn() -> Result<Box<dyn Bitmap>> + Send + Sync>;

/// Thread-safe mapping from engine name to constructor.
///
/// Registration takes the write lock; lookups take the read lock only long
/// enough to clone the constructor, which then runs unlocked.
#[derive(Default)]
pub struct Registry {
    engines: RwLock<HashMap<String, Constructor>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("engines", &self.engines())
            .finish()
    }
}

impl Registry {
    /// Create a registry with no engines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `bitset` and `roaring` engines.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(ENGINE_BITSET, || Ok(Box::new(ShardedBitset::new())));
        registry.register(ENGINE_ROARING, || Ok(Box::new(Roaring::new())));
        registry
    }

    /// Register `constructor` under `name`, replacing any previous entry.
    pub fn register<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Result<Box<dyn Bitmap>> + Send + Sync + 'static,
    {
        let name = name.into();
        let replaced = self
            .engines
            .write()
            .insert(name.clone(), Arc::new(constructor))
            .is_some();
        debug!("Registered bitmap engine {} (replaced: {})", name, replaced);
    }

    /// Build a new bitmap with the engine registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Bitmap>> {
        let constructor = self
            .constructor(name)
            .ok_or_else(|| BitmapError::NoSuchEngine(name.to_string()))?;
        constructor()
    }

    /// Whether an engine is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.engines.read().contains_key(name)
    }

    /// Registered engine names, sorted.
    pub fn engines(&self) -> Vec<String> {
        let mut names: Vec<_> = self.engines.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn constructor(&self, name: &str) -> Option<Constructor> {
        self.engines.read().get(name).cloned()
    }
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::with_builtins);

/// The process-wide registry, pre-populated with the built-in engines.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Register an engine in the process-wide registry.
pub fn register<F>(name: impl Into<String>, constructor: F)
where
    F: Fn() -> Result<Box<dyn Bitmap>> + Send + Sync + 'static,
{
    registry().register(name, constructor);
}

/// Build a bitmap from the process-wide registry.
pub fn new(name: &str) -> Result<Box<dyn Bitmap>> {
    registry().create(name)
}
