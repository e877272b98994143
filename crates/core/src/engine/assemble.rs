//! Phased assembly of tree units.
//!
//! For an owning tree unit, the assembler renders the owner, renders every
//! nested unit registered under it (in registration order) and attaches
//! them as publicly visible, statically scoped members, then writes the
//! finished container to the destination namespace. If the owner is in the
//! implementation-required set the whole sequence runs a second time for
//! the implementation phase, re-rendering owner and nested units alike: a
//! nested unit's shape may differ between phases, so nothing from the
//! interface pass is reused.

use tracing::debug;

use crate::engine::emit::{package_path, ArtifactSink};
use crate::engine::units::{Phase, TreeUnitHandle};
use crate::engine::GenerationContext;
use crate::error::Result;
use crate::ts::{Emit, TsFile};

/// Renders one owning tree unit, phase by phase, into an output sink.
#[derive(Debug)]
pub struct PhaseAssembler<'a, 'c> {
    ctx: &'a GenerationContext<'c>,
}

impl<'a, 'c> PhaseAssembler<'a, 'c> {
    /// An assembler over the given build context.
    pub fn new(ctx: &'a GenerationContext<'c>) -> Self {
        Self { ctx }
    }

    /// Assemble and write the unit's artifacts under a namespace.
    pub fn assemble(
        &self,
        handle: &TreeUnitHandle,
        package: &str,
        sink: &mut dyn ArtifactSink,
    ) -> Result<()> {
        self.assemble_phase(handle, package, Phase::Interface, sink)?;

        if self.ctx.index().is_implementation(handle.id) {
            self.assemble_phase(handle, package, Phase::Implementation, sink)?;
        }
        Ok(())
    }

    fn assemble_phase(
        &self,
        handle: &TreeUnitHandle,
        package: &str,
        phase: Phase,
        sink: &mut dyn ArtifactSink,
    ) -> Result<()> {
        let mut container = handle.unit().render(self.ctx, phase)?;

        for child in self.ctx.index().nested(handle.id) {
            let mut nested = child.unit().render(self.ctx, phase)?;
            nested.exported = true;
            container.nested.push(nested);
        }

        let name = container.name.clone();
        let file = TsFile::plain(container);
        let path = package_path(package).join(format!("{name}.ts"));
        debug!(path = %path.display(), ?phase, "Writing tree unit artifact.");
        sink.write(&path, &file.emit())?;
        Ok(())
    }
}
