//! Discovery and the construction pass.
//!
//! The engine does not implement discovery itself: a [`TypeFinder`]
//! collaborator scans the description and reports candidates to a
//! [`TypeFindingListener`]. The driver then runs every candidate's
//! construction logic against the build context. Candidate iteration
//! follows map order and is documented as unordered; construction must
//! not depend on it.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::engine::GenerationContext;
use crate::error::Result;

/// A discovered generator candidate, ready to construct its units.
pub trait GeneratorCandidate: Send + Sync {
    /// Build and register this candidate's generator units.
    fn construct(&self, ctx: &GenerationContext<'_>) -> Result<()>;
}

/// Collects discovered candidates by description-type name.
///
/// Backed by a map: duplicate names overwrite, and iteration order is not
/// guaranteed.
#[derive(Default)]
pub struct TypeFindingListener {
    found: HashMap<String, Box<dyn GeneratorCandidate>>,
}

impl TypeFindingListener {
    /// An empty listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a discovered candidate.
    pub fn found_type(&mut self, name: &str, candidate: Box<dyn GeneratorCandidate>) {
        self.found.insert(name.to_string(), candidate);
    }

    /// Number of distinct candidates collected so far.
    pub fn len(&self) -> usize {
        self.found.len()
    }

    /// Whether no candidates were collected.
    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    fn into_candidates(self) -> HashMap<String, Box<dyn GeneratorCandidate>> {
        self.found
    }
}

impl fmt::Debug for TypeFindingListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeFindingListener").field("found", &self.found.len()).finish()
    }
}

/// External collaborator that scans the description for candidates.
pub trait TypeFinder {
    /// Report every candidate to the listener.
    fn find_types(&self, listener: &mut TypeFindingListener) -> Result<()>;

    /// Hook invoked before construction, for index-dependent
    /// pre-registration.
    fn setup_construction(&self, ctx: &GenerationContext<'_>) -> Result<()>;
}

/// Runs discovery, the finder's setup hook, and every candidate's
/// construction. The first failing construction aborts the whole build;
/// there is no partial-result mode.
pub struct ConstructionDriver<'f> {
    finder: &'f dyn TypeFinder,
}

impl fmt::Debug for ConstructionDriver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConstructionDriver")
    }
}

impl<'f> ConstructionDriver<'f> {
    /// A driver over the given finder.
    pub fn new(finder: &'f dyn TypeFinder) -> Self {
        Self { finder }
    }

    /// Run the construction pass.
    pub fn run(&self, ctx: &GenerationContext<'_>) -> Result<()> {
        let mut listener = TypeFindingListener::new();
        self.finder.find_types(&mut listener)?;
        debug!(candidates = listener.len(), "Type discovery complete.");

        self.finder.setup_construction(ctx)?;

        for (name, candidate) in listener.into_candidates() {
            debug!(name, "Constructing generator units.");
            candidate.construct(ctx)?;
        }
        Ok(())
    }
}
