//! Generator unit variants and their rendering contracts.
//!
//! Units are the engine's closed set of generator shapes:
//!
//! - tree units render per phase and may own nested tree units,
//! - flat units render once, directly to the destination root,
//! - resource units render once to the resource namespace,
//! - support units render once to the support namespace.
//!
//! Dispatch is by pattern matching over [`GeneratorUnit`]; there is no
//! runtime type inspection.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::GenerationContext;
use crate::error::Result;
use crate::ts::{TsDecl, TsFile};

/// Rendering phase for tree units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Abstract declaration shape.
    Interface,
    /// Concrete default implementation shape.
    Implementation,
}

/// Stable arena index addressing a registered tree unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub(crate) usize);

/// A unit that renders one declaration per phase and may own nested units.
pub trait TreeRender: Send + Sync {
    /// Render this unit's declaration for the given phase.
    fn render(&self, ctx: &GenerationContext<'_>, phase: Phase) -> Result<TsDecl>;
}

/// A unit that renders once, without phases, straight to the destination
/// root (bypassing the namespace-qualified tree path).
pub trait FlatRender: Send + Sync {
    /// Render the unit's files, with paths relative to the destination root.
    fn render(&self, ctx: &GenerationContext<'_>) -> Result<Vec<RenderedFile>>;
}

/// A unit producing one resource artifact.
pub trait ResourceRender: Send + Sync {
    /// Render the resource's source file.
    fn render(&self, ctx: &GenerationContext<'_>) -> Result<TsFile>;
}

/// A unit producing one auxiliary support artifact.
pub trait SupportRender: Send + Sync {
    /// Render the support source file.
    fn render(&self, ctx: &GenerationContext<'_>) -> Result<TsFile>;
}

/// A rendered file ready to hand to the output sink.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    /// Path relative to the destination root.
    pub relative_path: PathBuf,
    /// File contents.
    pub contents: String,
}

/// Handle to a registered tree unit: the arena id plus the renderer.
#[derive(Clone)]
pub struct TreeUnitHandle {
    /// Arena id, used for the nested relation and the implementation set.
    pub id: UnitId,
    unit: Arc<dyn TreeRender>,
}

impl TreeUnitHandle {
    pub(crate) fn new(id: UnitId, unit: Arc<dyn TreeRender>) -> Self {
        Self { id, unit }
    }

    /// The renderer behind this handle.
    pub fn unit(&self) -> &dyn TreeRender {
        self.unit.as_ref()
    }
}

impl fmt::Debug for TreeUnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeUnitHandle").field("id", &self.id).finish()
    }
}

/// A registered generator unit.
#[derive(Clone)]
pub enum GeneratorUnit {
    /// Phased unit emitted under the model namespace.
    Tree(TreeUnitHandle),
    /// Single-shot unit emitted at the destination root.
    Flat(Arc<dyn FlatRender>),
}

impl fmt::Debug for GeneratorUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorUnit::Tree(handle) => f.debug_tuple("Tree").field(&handle.id).finish(),
            GeneratorUnit::Flat(_) => f.write_str("Flat"),
        }
    }
}
