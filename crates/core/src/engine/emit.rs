//! Top-level emission: the output sink and the emitter sequence.
//!
//! All writes go through [`ArtifactSink`]; the filesystem sink is the
//! production implementation, tests inject recording or failing sinks.
//! The emitter's sequence is fixed: shared support artifacts first (only
//! if resources exist, since resources depend on them), then type units,
//! then resources, then supports. A failed write aborts the remaining
//! sequence; the schema staging directory is released regardless.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::engine::assemble::PhaseAssembler;
use crate::engine::units::GeneratorUnit;
use crate::engine::GenerationContext;
use crate::error::Result;
use crate::generators::support;
use crate::ts::Emit;

/// Destination for rendered artifacts.
pub trait ArtifactSink {
    /// Write one artifact at a path relative to the destination root.
    fn write(&mut self, relative_path: &Path, contents: &str) -> io::Result<()>;
}

/// Filesystem sink rooted at the caller-supplied output directory.
#[derive(Debug)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    /// A sink writing under `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl ArtifactSink for FsSink {
    fn write(&mut self, relative_path: &Path, contents: &str) -> io::Result<()> {
        let target = self.root.join(relative_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, contents)
    }
}

/// Map a dot-separated namespace to a relative directory path.
pub fn package_path(package: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in package.split('.').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

/// Drives the full emission pass over a populated index.
#[derive(Debug)]
pub struct Emitter<'a, 'c> {
    ctx: &'a GenerationContext<'c>,
}

impl<'a, 'c> Emitter<'a, 'c> {
    /// An emitter over the given build context.
    pub fn new(ctx: &'a GenerationContext<'c>) -> Self {
        Self { ctx }
    }

    /// Emit every registered unit, then release the schema staging
    /// directory whether or not emission succeeded.
    pub fn generate(&self, sink: &mut dyn ArtifactSink) -> Result<()> {
        let result = self.emit_all(sink);
        self.ctx.index().release_staging();
        result
    }

    fn emit_all(&self, sink: &mut dyn ArtifactSink) -> Result<()> {
        let ctx = self.ctx;
        let resources = ctx.index().resources_snapshot();

        if !resources.is_empty() {
            debug!("Emitting shared support artifacts.");
            for file in support::shared_support() {
                let path =
                    package_path(ctx.support_package()).join(format!("{}.ts", file.decl.name));
                sink.write(&path, &file.emit())?;
            }
        }

        let assembler = PhaseAssembler::new(ctx);
        for (name, unit) in ctx.index().types_snapshot() {
            match unit {
                GeneratorUnit::Tree(handle) => {
                    debug!(name, "Emitting tree unit.");
                    assembler.assemble(&handle, ctx.model_package(), sink)?;
                }
                GeneratorUnit::Flat(flat) => {
                    debug!(name, "Emitting flat unit.");
                    for file in flat.render(ctx)? {
                        sink.write(&file.relative_path, &file.contents)?;
                    }
                }
            }
        }

        for resource in resources {
            let file = resource.render(ctx)?;
            let path = package_path(ctx.resource_package()).join(format!("{}.ts", file.decl.name));
            debug!(path = %path.display(), "Writing resource artifact.");
            sink.write(&path, &file.emit())?;
        }

        for unit in ctx.index().supports_snapshot() {
            let file = unit.render(ctx)?;
            let path = package_path(ctx.support_package()).join(format!("{}.ts", file.decl.name));
            debug!(path = %path.display(), "Writing support artifact.");
            sink.write(&path, &file.emit())?;
        }

        info!("Generation complete.");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::Configuration;
    use crate::engine::registry::{ExtensionRegistry, NoExtensionManager};
    use crate::engine::units::{
        FlatRender, GeneratorUnit, Phase, RenderedFile, ResourceRender, TreeRender,
    };
    use crate::engine::ModelIndex;
    use crate::model::ApiModel;
    use crate::ts::{DeclKind, TsDecl, TsFile};

    /// Sink that records every write in order.
    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(PathBuf, String)>,
    }

    impl ArtifactSink for RecordingSink {
        fn write(&mut self, relative_path: &Path, contents: &str) -> io::Result<()> {
            self.writes
                .push((relative_path.to_path_buf(), contents.to_string()));
            Ok(())
        }
    }

    /// Sink that fails every write.
    struct FailingSink;

    impl ArtifactSink for FailingSink {
        fn write(&mut self, _relative_path: &Path, _contents: &str) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    /// Tree unit whose declaration name and content depend on the phase.
    struct PhasedUnit {
        name: &'static str,
    }

    impl TreeRender for PhasedUnit {
        fn render(&self, _ctx: &GenerationContext<'_>, phase: Phase) -> Result<TsDecl> {
            let (name, ty) = match phase {
                Phase::Interface => (self.name.to_string(), "string"),
                Phase::Implementation => (format!("{}Impl", self.name), "number"),
            };
            Ok(TsDecl::new(&name, DeclKind::Alias { ty: ty.to_string() }))
        }
    }

    struct StubResource {
        name: &'static str,
    }

    impl ResourceRender for StubResource {
        fn render(&self, _ctx: &GenerationContext<'_>) -> Result<TsFile> {
            Ok(TsFile::plain(TsDecl::new(
                self.name,
                DeclKind::Alias { ty: "unknown".to_string() },
            )))
        }
    }

    struct StubFlat;

    impl FlatRender for StubFlat {
        fn render(&self, _ctx: &GenerationContext<'_>) -> Result<Vec<RenderedFile>> {
            Ok(vec![RenderedFile {
                relative_path: PathBuf::from("Loose.ts"),
                contents: "export type Loose = unknown;\n".to_string(),
            }])
        }
    }

    fn fixtures() -> (ApiModel, Configuration, ModelIndex, ExtensionRegistry) {
        let api = ApiModel::from_json(r#"{ "title": "Test" }"#).unwrap();
        let config = Configuration::default();
        let index = ModelIndex::new();
        let registry = ExtensionRegistry::from_configuration(&config, Arc::new(NoExtensionManager));
        (api, config, index, registry)
    }

    fn paths(sink: &RecordingSink) -> Vec<String> {
        sink.writes
            .iter()
            .map(|(path, _)| path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_package_path_maps_dots_to_directories() {
        assert_eq!(package_path("model"), PathBuf::from("model"));
        assert_eq!(package_path("api.model"), PathBuf::from("api").join("model"));
        assert_eq!(package_path(""), PathBuf::new());
    }

    #[test]
    fn test_tree_unit_without_implementation_emits_one_artifact() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        let handle = index.register_tree(Arc::new(PhasedUnit { name: "Widget" }));
        index.register_type("Widget", GeneratorUnit::Tree(handle));

        let mut sink = RecordingSink::default();
        Emitter::new(&ctx).generate(&mut sink).unwrap();

        assert_eq!(paths(&sink), vec!["model/Widget.ts"]);
    }

    #[test]
    fn test_tree_unit_with_implementation_emits_two_artifacts() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        let handle = index.register_tree(Arc::new(PhasedUnit { name: "Widget" }));
        index.register_type("Widget", GeneratorUnit::Tree(handle.clone()));
        index.mark_implementation(handle.id);

        let mut sink = RecordingSink::default();
        Emitter::new(&ctx).generate(&mut sink).unwrap();

        assert_eq!(paths(&sink), vec!["model/Widget.ts", "model/WidgetImpl.ts"]);
    }

    #[test]
    fn test_nested_units_embedded_per_phase_never_standalone() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        let owner = index.register_tree(Arc::new(PhasedUnit { name: "Widget" }));
        index.register_type("Widget", GeneratorUnit::Tree(owner.clone()));
        index.mark_implementation(owner.id);

        let first = index.register_tree(Arc::new(PhasedUnit { name: "Inner" }));
        let second = index.register_tree(Arc::new(PhasedUnit { name: "Other" }));
        index.register_nested(owner.id, first.id);
        index.register_nested(owner.id, second.id);

        let mut sink = RecordingSink::default();
        Emitter::new(&ctx).generate(&mut sink).unwrap();

        // Only the owner's two artifacts, nothing standalone for the
        // nested units.
        assert_eq!(paths(&sink), vec!["model/Widget.ts", "model/WidgetImpl.ts"]);

        let interface = &sink.writes[0].1;
        let implementation = &sink.writes[1].1;

        // Nested members appear in registration order.
        let inner_at = interface.find("type Inner").unwrap();
        let other_at = interface.find("type Other").unwrap();
        assert!(inner_at < other_at);

        // Phase determines the nested content: the implementation pass
        // re-renders the nested units.
        assert!(interface.contains("export type Inner = string;"));
        assert!(implementation.contains("export type InnerImpl = number;"));
        assert!(!implementation.contains("type Inner = string;"));
    }

    #[test]
    fn test_owner_with_zero_nested_units_is_fine() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        let handle = index.register_tree(Arc::new(PhasedUnit { name: "Lone" }));
        index.register_type("Lone", GeneratorUnit::Tree(handle));

        let mut sink = RecordingSink::default();
        Emitter::new(&ctx).generate(&mut sink).unwrap();
        assert!(sink.writes[0].1.contains("export type Lone = string;"));
        assert!(!sink.writes[0].1.contains("namespace"));
    }

    #[test]
    fn test_flat_unit_bypasses_namespaces() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        index.register_type("Loose", GeneratorUnit::Flat(Arc::new(StubFlat)));

        let mut sink = RecordingSink::default();
        Emitter::new(&ctx).generate(&mut sink).unwrap();
        assert_eq!(paths(&sink), vec!["Loose.ts"]);
    }

    #[test]
    fn test_no_resources_no_shared_support() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        let mut sink = RecordingSink::default();
        Emitter::new(&ctx).generate(&mut sink).unwrap();
        assert!(paths(&sink).is_empty());
    }

    #[test]
    fn test_shared_support_emitted_once_before_resources() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        index.register_resource(Arc::new(StubResource { name: "PetsClient" }));
        index.register_resource(Arc::new(StubResource { name: "OwnersClient" }));

        let mut sink = RecordingSink::default();
        Emitter::new(&ctx).generate(&mut sink).unwrap();

        let all = paths(&sink);
        let api_error_writes = all.iter().filter(|p| p.ends_with("ApiError.ts")).count();
        assert_eq!(api_error_writes, 1);

        let support_at = all.iter().position(|p| *p == "support/ApiError.ts").unwrap();
        let first_resource = all.iter().position(|p| p.starts_with("resources/")).unwrap();
        assert!(support_at < first_resource);

        // Resources keep registration order.
        assert!(all.contains(&"resources/PetsClient.ts".to_string()));
        assert!(all.contains(&"resources/OwnersClient.ts".to_string()));
    }

    #[test]
    fn test_staging_released_on_success() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        let staging = index.schema_staging().unwrap();
        assert!(staging.exists());

        let mut sink = RecordingSink::default();
        Emitter::new(&ctx).generate(&mut sink).unwrap();
        assert!(!staging.exists());
    }

    #[test]
    fn test_staging_released_on_write_failure() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        let handle = index.register_tree(Arc::new(PhasedUnit { name: "Widget" }));
        index.register_type("Widget", GeneratorUnit::Tree(handle));

        let staging = index.schema_staging().unwrap();
        assert!(staging.exists());

        let err = Emitter::new(&ctx).generate(&mut FailingSink).unwrap_err();
        assert!(matches!(err, crate::error::GenerationError::Io(_)));
        assert!(!staging.exists());
    }

    #[test]
    fn test_write_failure_aborts_remaining_sequence() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);

        index.register_resource(Arc::new(StubResource { name: "PetsClient" }));

        // Fails on the very first write (shared support), so no resource
        // artifact is ever attempted.
        struct CountingFailSink {
            attempts: usize,
        }
        impl ArtifactSink for CountingFailSink {
            fn write(&mut self, _p: &Path, _c: &str) -> io::Result<()> {
                self.attempts += 1;
                Err(io::Error::other("disk full"))
            }
        }

        let mut sink = CountingFailSink { attempts: 0 };
        assert!(Emitter::new(&ctx).generate(&mut sink).is_err());
        assert_eq!(sink.attempts, 1);
    }
}
