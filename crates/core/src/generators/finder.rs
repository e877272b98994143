//! Built-in type finder over the description model.
//!
//! Walks the parsed description and reports one candidate per declared
//! type and resource. The engine only ever sees the `TypeFinder` trait;
//! callers with their own discovery replace this wholesale.

use std::sync::Arc;

use crate::engine::construct::{TypeFinder, TypeFindingListener};
use crate::engine::GenerationContext;
use crate::error::Result;
use crate::generators::resources::ResourceCandidate;
use crate::generators::support::runtime_types;
use crate::generators::types::TypeCandidate;
use crate::model::ApiModel;

/// Finder yielding a candidate for every declared type and resource.
#[derive(Debug)]
pub struct ModelTypeFinder<'a> {
    api: &'a ApiModel,
}

impl<'a> ModelTypeFinder<'a> {
    /// A finder over the given description.
    pub fn new(api: &'a ApiModel) -> Self {
        Self { api }
    }
}

impl TypeFinder for ModelTypeFinder<'_> {
    fn find_types(&self, listener: &mut TypeFindingListener) -> Result<()> {
        for decl in &self.api.types {
            listener.found_type(&decl.name, Box::new(TypeCandidate::new(decl.clone())));
        }
        for decl in &self.api.resources {
            listener.found_type(
                &format!("resource:{}", decl.name),
                Box::new(ResourceCandidate::new(decl.clone())),
            );
        }
        Ok(())
    }

    fn setup_construction(&self, ctx: &GenerationContext<'_>) -> Result<()> {
        ctx.index().register_support(Arc::new(runtime_types()));
        Ok(())
    }
}
