//! The generation engine: registry, extension resolution, phased assembly
//! and emission.
//!
//! A build is two sequential passes over one [`ModelIndex`]:
//!
//! 1. construction: discovery via the type finder populates the index with
//!    generator units (may be parallelized by the caller; the index
//!    tolerates concurrent writers);
//! 2. emission: the emitter walks the populated index and writes every
//!    artifact through the output sink.
//!
//! State shared between extension callbacks travels in an explicit
//! [`GenerationContext`] value; there is no hidden ambient build object.

pub mod annotations;
pub mod assemble;
pub mod construct;
pub mod emit;
pub mod extension;
pub mod index;
pub mod registry;
pub mod units;

use std::path::Path;
use std::sync::Arc;

use crate::config::Configuration;
use crate::error::Result;
use crate::model::ApiModel;

pub use annotations::{Event, EventKind};
pub use construct::{ConstructionDriver, GeneratorCandidate, TypeFinder, TypeFindingListener};
pub use emit::{ArtifactSink, Emitter, FsSink};
pub use extension::NoOpExtension;
pub use index::ModelIndex;
pub use registry::{ExtensionManager, ExtensionRegistry, NoExtensionManager};
pub use units::{GeneratorUnit, Phase, UnitId};

/// Everything an extension callback or generator unit may need: the build
/// index, the read-only description, the configuration and the extension
/// registry. Passed by reference into every call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    api: &'a ApiModel,
    config: &'a Configuration,
    index: &'a ModelIndex,
    registry: &'a ExtensionRegistry,
}

impl<'a> GenerationContext<'a> {
    /// Assemble a context from its parts.
    pub fn new(
        api: &'a ApiModel,
        config: &'a Configuration,
        index: &'a ModelIndex,
        registry: &'a ExtensionRegistry,
    ) -> Self {
        Self {
            api,
            config,
            index,
            registry,
        }
    }

    /// The read-only API description.
    pub fn api(&self) -> &'a ApiModel {
        self.api
    }

    /// The build configuration.
    pub fn config(&self) -> &'a Configuration {
        self.config
    }

    /// The build index.
    pub fn index(&self) -> &'a ModelIndex {
        self.index
    }

    /// The extension registry.
    pub fn registry(&self) -> &'a ExtensionRegistry {
        self.registry
    }

    /// Destination namespace for type artifacts.
    pub fn model_package(&self) -> &'a str {
        &self.config.model_package
    }

    /// Destination namespace for resource artifacts.
    pub fn resource_package(&self) -> &'a str {
        &self.config.resource_package
    }

    /// Destination namespace for support artifacts.
    pub fn support_package(&self) -> &'a str {
        &self.config.support_package
    }
}

/// Run a full build against a destination directory.
pub fn generate(
    api: &ApiModel,
    finder: &dyn TypeFinder,
    manager: Arc<dyn ExtensionManager>,
    config: &Configuration,
    root: &Path,
) -> Result<()> {
    let mut sink = FsSink::new(root);
    generate_with_sink(api, finder, manager, config, &mut sink)
}

/// Run a full build against an arbitrary output sink.
///
/// Construction first, then emission. The schema staging directory, if it
/// was ever created, is released before this returns, on success and on
/// failure alike.
pub fn generate_with_sink(
    api: &ApiModel,
    finder: &dyn TypeFinder,
    manager: Arc<dyn ExtensionManager>,
    config: &Configuration,
    sink: &mut dyn ArtifactSink,
) -> Result<()> {
    let index = ModelIndex::new();
    let registry = ExtensionRegistry::from_configuration(config, manager);
    let ctx = GenerationContext::new(api, config, &index, &registry);

    let driver = ConstructionDriver::new(finder);
    let result = driver
        .run(&ctx)
        .and_then(|()| Emitter::new(&ctx).generate(sink));

    // The emitter releases staging itself; this covers construction
    // failures and is a no-op otherwise.
    index.release_staging();
    result
}
