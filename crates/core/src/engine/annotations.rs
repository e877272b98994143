//! Generation events and the extension-resolution protocol.
//!
//! An [`Event`] names one extension point: an annotation key that parsed
//! description nodes may carry, plus whether the point fires on creation
//! or on finish. Resolution follows one protocol everywhere:
//!
//! 1. a parsed node resolves through its own annotations: the identifiers
//!    declared under the event's key are instantiated and composed;
//! 2. a synthetic node falls back to the configured global default for the
//!    event's kind, or to the no-op extension (creation events may instead
//!    fall back to a supplied default);
//! 3. resource-class events compose additively: the default class
//!    extension and the per-node resolved one both apply, in that order.
//!
//! "Nothing configured" is always a defined default path, never an error;
//! only a failing or unknown extension identifier aborts the build.

use std::sync::Arc;

use crate::engine::extension::{
    CompositeResourceExtension, ExtensionSet, FieldExtension, FieldExtensionChain,
    GlobalResourceExtension, MethodExtension, MethodExtensionChain, NoOpExtension,
    ResourceClassChain, ResourceClassExtension, ResourceMethodExtension, ResponseClassExtension,
    ResponseMethodExtension, TypeExtension, TypeExtensionChain,
};
use crate::engine::GenerationContext;
use crate::error::Result;
use crate::model::{AnnotationMap, MethodNode, ResourceNode, ResponseNode, TypeNode};

/// Whether an extension point fires while a construct is being created or
/// when it is being finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The construct is about to be built.
    Creation,
    /// The construct is complete and about to be emitted.
    Finish,
}

/// A generation event: one named extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Annotation key parsed nodes declare extension ids under.
    pub key: &'static str,
    /// When the point fires.
    pub kind: EventKind,
}

/// Type declaration assembled for a phase.
pub const ON_TYPE_CREATION: Event = Event {
    key: "type-creation",
    kind: EventKind::Creation,
};

/// Field property being built.
pub const ON_FIELD_CREATION: Event = Event {
    key: "field-creation",
    kind: EventKind::Creation,
};

/// Method on a type implementation being built.
pub const ON_METHOD_CREATION: Event = Event {
    key: "method-creation",
    kind: EventKind::Creation,
};

/// Resource class skeleton created.
pub const ON_RESOURCE_CLASS_CREATION: Event = Event {
    key: "resource-class-creation",
    kind: EventKind::Creation,
};

/// Resource class fully assembled.
pub const ON_RESOURCE_CLASS_FINISH: Event = Event {
    key: "resource-class-finish",
    kind: EventKind::Finish,
};

/// Resource method being built.
pub const ON_RESOURCE_METHOD_CREATION: Event = Event {
    key: "resource-method-creation",
    kind: EventKind::Creation,
};

/// Resource method fully assembled.
pub const ON_RESOURCE_METHOD_FINISH: Event = Event {
    key: "resource-method-finish",
    kind: EventKind::Finish,
};

/// Response wrapper class being built.
pub const ON_RESPONSE_CLASS_CREATION: Event = Event {
    key: "response-class-creation",
    kind: EventKind::Creation,
};

/// Response factory method being built.
pub const ON_RESPONSE_METHOD_CREATION: Event = Event {
    key: "response-method-creation",
    kind: EventKind::Creation,
};

fn compose_type(mut members: Vec<Arc<dyn TypeExtension>>) -> Arc<dyn TypeExtension> {
    if members.len() == 1 {
        if let Some(single) = members.pop() {
            return single;
        }
    }
    if members.is_empty() {
        return Arc::new(NoOpExtension);
    }
    let mut chain = TypeExtensionChain::default();
    for member in members {
        chain.add(member);
    }
    Arc::new(chain)
}

fn compose_resource(
    mut members: Vec<Arc<dyn GlobalResourceExtension>>,
) -> Arc<dyn GlobalResourceExtension> {
    if members.len() == 1 {
        if let Some(single) = members.pop() {
            return single;
        }
    }
    if members.is_empty() {
        return Arc::new(NoOpExtension);
    }
    Arc::new(CompositeResourceExtension::new(members))
}

impl GenerationContext<'_> {
    /// Instantiate and merge every extension id declared under the event's
    /// key in the given annotations.
    fn resolved_set(&self, annotations: &AnnotationMap, event: Event) -> Result<ExtensionSet> {
        let mut set = ExtensionSet::default();
        if let Some(ids) = annotations.get(event.key) {
            for id in ids {
                set.merge(self.registry().create_extensions(id)?);
            }
        }
        Ok(set)
    }

    /// The globally configured fallback set for an event kind, if any.
    fn fallback_set(&self, event: Event) -> Result<Option<ExtensionSet>> {
        let id = match event.kind {
            EventKind::Creation => self.config().default_creation_extension.as_deref(),
            EventKind::Finish => self.config().default_finish_extension.as_deref(),
        };
        match id {
            Some(id) => Ok(Some(self.registry().create_extensions(id)?)),
            None => Ok(None),
        }
    }

    /// Resolve the type extension handling an event on a type node.
    pub fn type_extension(
        &self,
        event: Event,
        node: &TypeNode<'_>,
    ) -> Result<Arc<dyn TypeExtension>> {
        match node.annotations() {
            Some(annotations) => Ok(compose_type(self.resolved_set(annotations, event)?.type_extensions)),
            None => match self.fallback_set(event)? {
                Some(set) if !set.type_extensions.is_empty() => {
                    Ok(compose_type(set.type_extensions))
                }
                _ => Ok(Arc::new(NoOpExtension)),
            },
        }
    }

    /// Resolve the field extension handling an event on a type node.
    pub fn field_extension(
        &self,
        event: Event,
        node: &TypeNode<'_>,
    ) -> Result<Arc<dyn FieldExtension>> {
        let members = match node.annotations() {
            Some(annotations) => self.resolved_set(annotations, event)?.field_extensions,
            None => self
                .fallback_set(event)?
                .map(|set| set.field_extensions)
                .unwrap_or_default(),
        };
        Ok(Arc::new(FieldExtensionChain::new(members)))
    }

    /// Resolve the method extension handling an event on a type node.
    pub fn method_extension(
        &self,
        event: Event,
        node: &TypeNode<'_>,
    ) -> Result<Arc<dyn MethodExtension>> {
        let members = match node.annotations() {
            Some(annotations) => self.resolved_set(annotations, event)?.method_extensions,
            None => self
                .fallback_set(event)?
                .map(|set| set.method_extensions)
                .unwrap_or_default(),
        };
        Ok(Arc::new(MethodExtensionChain::new(members)))
    }

    /// Resolve the resource method extension handling an event.
    pub fn resource_method_extension(
        &self,
        event: Event,
        node: &MethodNode<'_>,
    ) -> Result<Arc<dyn ResourceMethodExtension>> {
        let composed: Arc<dyn ResourceMethodExtension> = match node.annotations() {
            Some(annotations) => {
                compose_resource(self.resolved_set(annotations, event)?.resource_extensions)
            }
            None => self.global_resource_fallback(event)?,
        };
        Ok(composed)
    }

    /// Resolve the resource class extension handling an event.
    ///
    /// For parsed nodes the composition is additive: the supplied default
    /// class extension and the per-node resolved extension both apply, in
    /// that order.
    pub fn resource_class_extension(
        &self,
        default: Arc<dyn ResourceClassExtension>,
        event: Event,
        node: &ResourceNode<'_>,
    ) -> Result<Arc<dyn ResourceClassExtension>> {
        match node.annotations() {
            Some(annotations) => {
                let resolved: Arc<dyn ResourceClassExtension> =
                    compose_resource(self.resolved_set(annotations, event)?.resource_extensions);
                Ok(Arc::new(ResourceClassChain::new(vec![default, resolved])))
            }
            None => match (event.kind, self.fallback_set(event)?) {
                (_, Some(set)) if !set.resource_extensions.is_empty() => {
                    let composed: Arc<dyn ResourceClassExtension> =
                        compose_resource(set.resource_extensions);
                    Ok(composed)
                }
                (EventKind::Creation, _) => Ok(default),
                (EventKind::Finish, _) => Ok(Arc::new(NoOpExtension)),
            },
        }
    }

    /// Resolve the response class extension handling an event.
    pub fn response_class_extension(
        &self,
        event: Event,
        node: &MethodNode<'_>,
    ) -> Result<Arc<dyn ResponseClassExtension>> {
        let composed: Arc<dyn ResponseClassExtension> = match node.annotations() {
            Some(annotations) => {
                compose_resource(self.resolved_set(annotations, event)?.resource_extensions)
            }
            None => self.global_resource_fallback(event)?,
        };
        Ok(composed)
    }

    /// Resolve the response method extension handling an event.
    pub fn response_method_extension(
        &self,
        event: Event,
        node: &ResponseNode<'_>,
    ) -> Result<Arc<dyn ResponseMethodExtension>> {
        let composed: Arc<dyn ResponseMethodExtension> = match node.annotations() {
            Some(annotations) => {
                compose_resource(self.resolved_set(annotations, event)?.resource_extensions)
            }
            None => self.global_resource_fallback(event)?,
        };
        Ok(composed)
    }

    /// Global fallback for resource-level events on synthetic nodes:
    /// the configured default for the event kind, or the no-op extension.
    fn global_resource_fallback(&self, event: Event) -> Result<Arc<dyn GlobalResourceExtension>> {
        match self.fallback_set(event)? {
            Some(set) if !set.resource_extensions.is_empty() => {
                Ok(compose_resource(set.resource_extensions))
            }
            _ => Ok(Arc::new(NoOpExtension)),
        }
    }
}
