//! Extension activation and discovery.
//!
//! Extensions are constructible in two ways: through the compile-time
//! factory map of recognized identifiers (the built-in extensions, also
//! used for configuration tag activation), or through a caller-supplied
//! [`ExtensionManager`] that resolves logical names to constructors.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::Configuration;
use crate::engine::extension::{CompositeResourceExtension, ExtensionSet, TypeExtensionChain};
use crate::error::{GenerationError, Result};
use crate::extensions::builtin;

/// Constructor for everything one extension identifier contributes.
pub type ExtensionConstructor =
    fn() -> std::result::Result<ExtensionSet, Box<dyn std::error::Error + Send + Sync>>;

/// Pluggable lookup from a logical extension name to zero or more
/// constructors. Callers plug their own discovery mechanism in here; the
/// engine only ever calls `resolve_by_name`.
pub trait ExtensionManager: Send + Sync {
    /// Resolve a logical name to the constructors registered for it.
    fn resolve_by_name(&self, name: &str) -> Vec<ExtensionConstructor>;
}

/// The default manager: resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtensionManager;

impl ExtensionManager for NoExtensionManager {
    fn resolve_by_name(&self, _name: &str) -> Vec<ExtensionConstructor> {
        Vec::new()
    }
}

/// Active extension chains for one build, plus the discovery paths.
pub struct ExtensionRegistry {
    type_chain: TypeExtensionChain,
    resource_chain: CompositeResourceExtension,
    manager: Arc<dyn ExtensionManager>,
}

impl ExtensionRegistry {
    /// Build the registry from a configuration's activation tags.
    ///
    /// Tags are processed in order; each recognized tag appends its
    /// built-in extension(s) to the relevant chain(s). Unrecognized tags
    /// are ignored, deliberately.
    pub fn from_configuration(config: &Configuration, manager: Arc<dyn ExtensionManager>) -> Self {
        let mut type_chain = TypeExtensionChain::default();
        let mut resource_chain = CompositeResourceExtension::default();

        for tag in &config.type_extension_tags {
            match builtin(tag) {
                Some(constructor) => {
                    let set = constructor();
                    for ext in set.type_extensions {
                        type_chain.add(ext);
                    }
                    for ext in set.resource_extensions {
                        resource_chain.add(ext);
                    }
                }
                None => {
                    debug!(tag, "Ignoring unrecognized extension tag.");
                }
            }
        }

        Self {
            type_chain,
            resource_chain,
            manager,
        }
    }

    /// The activated type extension chain, in tag order.
    pub fn type_listeners(&self) -> &TypeExtensionChain {
        &self.type_chain
    }

    /// The activated resource extension chain, in tag order.
    pub fn resource_listeners(&self) -> &CompositeResourceExtension {
        &self.resource_chain
    }

    /// Construct the extensions behind an identifier.
    ///
    /// Tries the compile-time factory map first; on a miss, asks the
    /// extension manager for constructors registered under the logical
    /// name and builds every match. An identifier neither path can
    /// resolve, or a failing constructor, is an instantiation error.
    pub fn create_extensions(&self, id: &str) -> Result<ExtensionSet> {
        if let Some(constructor) = builtin(id) {
            return Ok(constructor());
        }

        let constructors = self.manager.resolve_by_name(id);
        if constructors.is_empty() {
            return Err(GenerationError::unknown_extension(id));
        }

        let mut set = ExtensionSet::default();
        for constructor in constructors {
            let resolved = constructor().map_err(|source| GenerationError::ExtensionInstantiation {
                id: id.to_string(),
                source: Some(source),
            })?;
            set.merge(resolved);
        }
        Ok(set)
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("type_chain", &self.type_chain)
            .field("resource_chain", &self.resource_chain)
            .finish()
    }
}
