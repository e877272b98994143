//! The process-scoped build registry.
//!
//! [`ModelIndex`] maps description-type names to generator units, keeps the
//! ordered resource and support unit lists, the owner->children nested
//! relation over an id-addressed arena, and the implementation-required
//! set. It also owns the lazily created schema staging directory for the
//! duration of the build.
//!
//! Insertion is thread-safe (the discovery pass may be parallelized by the
//! caller); the emission pass reads strictly after construction completes.
//! Mutation is append/overwrite only: nothing is deleted during a build.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::engine::units::{
    GeneratorUnit, ResourceRender, SupportRender, TreeRender, TreeUnitHandle, UnitId,
};
use crate::error::{GenerationError, Result};

#[derive(Default)]
struct IndexState {
    arena: Vec<Arc<dyn TreeRender>>,
    types: HashMap<String, GeneratorUnit>,
    resources: Vec<Arc<dyn ResourceRender>>,
    supports: Vec<Arc<dyn SupportRender>>,
    nested: HashMap<UnitId, Vec<UnitId>>,
    implementations: HashSet<UnitId>,
}

enum StagingState {
    Untouched,
    Active(TempDir),
    Released,
}

/// Process-scoped registry populated during construction and read during
/// emission. Dropped with the build; nothing persists across runs.
pub struct ModelIndex {
    state: RwLock<IndexState>,
    staging: Mutex<StagingState>,
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(IndexState::default()),
            staging: Mutex::new(StagingState::Untouched),
        }
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a tree unit into the arena and return its handle.
    pub fn register_tree(&self, unit: Arc<dyn TreeRender>) -> TreeUnitHandle {
        let mut state = self.write_state();
        let id = UnitId(state.arena.len());
        state.arena.push(Arc::clone(&unit));
        TreeUnitHandle::new(id, unit)
    }

    /// Register a generator unit under a description-type name.
    ///
    /// Re-registration overwrites silently: the last writer wins. This is
    /// deliberate, documented permissiveness, not an error.
    pub fn register_type(&self, name: &str, unit: GeneratorUnit) {
        self.write_state().types.insert(name.to_string(), unit);
    }

    /// Look up the generator unit registered under a type name.
    pub fn lookup_type(&self, name: &str) -> Result<GeneratorUnit> {
        self.read_state()
            .types
            .get(name)
            .cloned()
            .ok_or_else(|| GenerationError::NoSuchType(name.to_string()))
    }

    /// Append a resource unit.
    pub fn register_resource(&self, unit: Arc<dyn ResourceRender>) {
        self.write_state().resources.push(unit);
    }

    /// Append a support unit.
    pub fn register_support(&self, unit: Arc<dyn SupportRender>) {
        self.write_state().supports.push(unit);
    }

    /// Append a child to the owner's ordered nested list.
    pub fn register_nested(&self, owner: UnitId, child: UnitId) {
        self.write_state().nested.entry(owner).or_default().push(child);
    }

    /// Mark a tree unit as requiring the implementation phase.
    pub fn mark_implementation(&self, owner: UnitId) {
        self.write_state().implementations.insert(owner);
    }

    /// Whether a tree unit requires the implementation phase.
    pub fn is_implementation(&self, id: UnitId) -> bool {
        self.read_state().implementations.contains(&id)
    }

    /// Resolved handles of the owner's nested units, in registration order.
    pub fn nested(&self, owner: UnitId) -> Vec<TreeUnitHandle> {
        let state = self.read_state();
        state
            .nested
            .get(&owner)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|id| {
                        state
                            .arena
                            .get(id.0)
                            .map(|unit| TreeUnitHandle::new(*id, Arc::clone(unit)))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of all registered type units. Iteration order follows the
    /// underlying associative container and must not be relied upon.
    pub fn types_snapshot(&self) -> Vec<(String, GeneratorUnit)> {
        self.read_state()
            .types
            .iter()
            .map(|(name, unit)| (name.clone(), unit.clone()))
            .collect()
    }

    /// Snapshot of registered resource units, in registration order.
    pub fn resources_snapshot(&self) -> Vec<Arc<dyn ResourceRender>> {
        self.read_state().resources.clone()
    }

    /// Snapshot of registered support units, in registration order.
    pub fn supports_snapshot(&self) -> Vec<Arc<dyn SupportRender>> {
        self.read_state().supports.clone()
    }

    /// Path of the schema staging directory, creating it on first use.
    pub fn schema_staging(&self) -> Result<PathBuf> {
        let mut staging = self.staging.lock().unwrap_or_else(PoisonError::into_inner);
        if let StagingState::Active(dir) = &*staging {
            return Ok(dir.path().to_path_buf());
        }
        let dir = TempDir::new()?;
        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "Created schema staging directory.");
        *staging = StagingState::Active(dir);
        Ok(path)
    }

    /// Path of the staging directory, if one was created and not yet
    /// released.
    pub fn staging_path(&self) -> Option<PathBuf> {
        let staging = self.staging.lock().unwrap_or_else(PoisonError::into_inner);
        match &*staging {
            StagingState::Active(dir) => Some(dir.path().to_path_buf()),
            StagingState::Untouched | StagingState::Released => None,
        }
    }

    /// Remove the staging directory if it exists. Safe to call more than
    /// once; only the first call after creation does any work.
    pub fn release_staging(&self) {
        let mut staging = self.staging.lock().unwrap_or_else(PoisonError::into_inner);
        let state = std::mem::replace(&mut *staging, StagingState::Released);
        if let StagingState::Active(dir) = state {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                warn!(path = %path.display(), "Failed to remove schema staging directory: {err}");
            } else {
                debug!(path = %path.display(), "Removed schema staging directory.");
            }
        }
    }
}

impl fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("ModelIndex")
            .field("types", &state.types.len())
            .field("resources", &state.resources.len())
            .field("supports", &state.supports.len())
            .field("nested", &state.nested.len())
            .field("implementations", &state.implementations.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::units::Phase;
    use crate::engine::GenerationContext;
    use crate::error::GenerationError;
    use crate::ts::{DeclKind, TsDecl};

    struct MarkerUnit {
        marker: &'static str,
    }

    impl TreeRender for MarkerUnit {
        fn render(&self, _ctx: &GenerationContext<'_>, _phase: Phase) -> Result<TsDecl> {
            Ok(TsDecl::new(
                self.marker,
                DeclKind::Alias {
                    ty: "string".to_string(),
                },
            ))
        }
    }

    fn marker(marker: &'static str) -> Arc<dyn TreeRender> {
        Arc::new(MarkerUnit { marker })
    }

    #[test]
    fn test_duplicate_registration_overwrites_silently() {
        let index = ModelIndex::new();
        let first = index.register_tree(marker("first"));
        let second = index.register_tree(marker("second"));

        index.register_type("Pet", GeneratorUnit::Tree(first));
        index.register_type("Pet", GeneratorUnit::Tree(second.clone()));

        let looked_up = index.lookup_type("Pet").unwrap();
        let GeneratorUnit::Tree(handle) = looked_up else {
            unreachable!("registered a tree unit");
        };
        assert_eq!(handle.id, second.id);
    }

    #[test]
    fn test_lookup_unregistered_name_fails_with_no_such_type() {
        let index = ModelIndex::new();
        let err = index.lookup_type("Ghost").unwrap_err();
        assert!(matches!(err, GenerationError::NoSuchType(ref name) if name == "Ghost"));
        assert!(err.to_string().contains("Ghost"));
    }

    #[test]
    fn test_nested_registration_order_is_preserved() {
        let index = ModelIndex::new();
        let owner = index.register_tree(marker("owner"));
        let a = index.register_tree(marker("a"));
        let b = index.register_tree(marker("b"));
        let c = index.register_tree(marker("c"));

        index.register_nested(owner.id, a.id);
        index.register_nested(owner.id, b.id);
        index.register_nested(owner.id, c.id);

        let nested: Vec<_> = index.nested(owner.id).iter().map(|h| h.id).collect();
        assert_eq!(nested, vec![a.id, b.id, c.id]);
        assert!(index.nested(a.id).is_empty());
    }

    #[test]
    fn test_implementation_set_membership() {
        let index = ModelIndex::new();
        let one = index.register_tree(marker("one"));
        let two = index.register_tree(marker("two"));

        index.mark_implementation(one.id);

        assert!(index.is_implementation(one.id));
        assert!(!index.is_implementation(two.id));
    }

    #[test]
    fn test_staging_created_lazily_and_released_once() {
        let index = ModelIndex::new();
        assert!(index.staging_path().is_none());

        let path = index.schema_staging().unwrap();
        assert!(path.exists());
        // Second call reuses the same directory.
        assert_eq!(index.schema_staging().unwrap(), path);

        index.release_staging();
        assert!(!path.exists());
        assert!(index.staging_path().is_none());
        // Releasing again is a no-op.
        index.release_staging();
    }

    #[test]
    fn test_staging_released_on_drop() {
        let path;
        {
            let index = ModelIndex::new();
            path = index.schema_staging().unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_registration() {
        let index = Arc::new(ModelIndex::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    let handle = index.register_tree(marker("threaded"));
                    index.register_type(&format!("Type{i}"), GeneratorUnit::Tree(handle));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(index.types_snapshot().len(), 8);
    }
}
