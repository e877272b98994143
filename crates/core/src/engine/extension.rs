//! Extension point contracts, the no-op extension, and composition.
//!
//! An extension observes or alters the generation of one model construct.
//! Every hook is total: it receives the artifact built so far and returns
//! the (possibly unchanged) artifact, so "no extension configured" is just
//! the no-op extension, never a sentinel.
//!
//! Two composition shapes exist:
//!
//! - chains ([`TypeExtensionChain`], [`CompositeResourceExtension`]) apply
//!   every member in activation order;
//! - [`ResourceClassChain`] is the additive composition of a default class
//!   extension with a per-node resolved one, applied in that order.

use std::fmt;
use std::sync::Arc;

use crate::engine::GenerationContext;
use crate::engine::units::Phase;
use crate::model::{MethodNode, ResourceNode, ResponseNode, TypeNode};
use crate::ts::{TsDecl, TsMethod, TsProp};

/// Hook into type declaration generation.
pub trait TypeExtension: Send + Sync {
    /// Identifier used for diagnostics and chain introspection.
    fn name(&self) -> &'static str;

    /// Called once the declaration for a phase has been assembled.
    fn on_type(
        &self,
        _ctx: &GenerationContext<'_>,
        _node: &TypeNode<'_>,
        decl: TsDecl,
        _phase: Phase,
    ) -> TsDecl {
        decl
    }
}

/// Hook into field generation on a type.
pub trait FieldExtension: Send + Sync {
    /// Called for each field property as it is built.
    fn on_field(&self, _ctx: &GenerationContext<'_>, _node: &TypeNode<'_>, prop: TsProp) -> TsProp {
        prop
    }
}

/// Hook into method generation on a type.
pub trait MethodExtension: Send + Sync {
    /// Called for each generated method on a type's implementation.
    fn on_method(
        &self,
        _ctx: &GenerationContext<'_>,
        _node: &TypeNode<'_>,
        method: TsMethod,
    ) -> TsMethod {
        method
    }
}

/// Hook into resource class generation.
pub trait ResourceClassExtension: Send + Sync {
    /// Called on the resource class declaration.
    fn on_resource_class(
        &self,
        _ctx: &GenerationContext<'_>,
        _node: &ResourceNode<'_>,
        decl: TsDecl,
    ) -> TsDecl {
        decl
    }
}

/// Hook into resource method generation.
pub trait ResourceMethodExtension: Send + Sync {
    /// Called on each generated resource method.
    fn on_resource_method(
        &self,
        _ctx: &GenerationContext<'_>,
        _node: &MethodNode<'_>,
        method: TsMethod,
    ) -> TsMethod {
        method
    }
}

/// Hook into response class generation.
pub trait ResponseClassExtension: Send + Sync {
    /// Called on each generated response wrapper declaration.
    fn on_response_class(
        &self,
        _ctx: &GenerationContext<'_>,
        _node: &MethodNode<'_>,
        decl: TsDecl,
    ) -> TsDecl {
        decl
    }
}

/// Hook into response factory method generation.
pub trait ResponseMethodExtension: Send + Sync {
    /// Called on each generated response factory method.
    fn on_response_method(
        &self,
        _ctx: &GenerationContext<'_>,
        _node: &ResponseNode<'_>,
        method: TsMethod,
    ) -> TsMethod {
        method
    }
}

/// Umbrella over every resource-level hook; the unit of activation for
/// resource extensions.
pub trait GlobalResourceExtension:
    ResourceClassExtension + ResourceMethodExtension + ResponseClassExtension + ResponseMethodExtension
{
    /// Identifier used for diagnostics and chain introspection.
    fn name(&self) -> &'static str;
}

/// The designated no-op extension: every hook returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpExtension;

impl TypeExtension for NoOpExtension {
    fn name(&self) -> &'static str {
        "noop"
    }
}
impl FieldExtension for NoOpExtension {}
impl MethodExtension for NoOpExtension {}
impl ResourceClassExtension for NoOpExtension {}
impl ResourceMethodExtension for NoOpExtension {}
impl ResponseClassExtension for NoOpExtension {}
impl ResponseMethodExtension for NoOpExtension {}
impl GlobalResourceExtension for NoOpExtension {
    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Ordered chain of type extensions; applies every member in order.
#[derive(Clone, Default)]
pub struct TypeExtensionChain {
    members: Vec<Arc<dyn TypeExtension>>,
}

impl TypeExtensionChain {
    /// Append an extension to the end of the chain.
    pub fn add(&mut self, ext: Arc<dyn TypeExtension>) {
        self.members.push(ext);
    }

    /// Member identifiers, in chain order.
    pub fn member_names(&self) -> Vec<&'static str> {
        self.members.iter().map(|m| m.name()).collect()
    }
}

impl TypeExtension for TypeExtensionChain {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn on_type(
        &self,
        ctx: &GenerationContext<'_>,
        node: &TypeNode<'_>,
        decl: TsDecl,
        phase: Phase,
    ) -> TsDecl {
        self.members
            .iter()
            .fold(decl, |decl, member| member.on_type(ctx, node, decl, phase))
    }
}

impl fmt::Debug for TypeExtensionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeExtensionChain").field(&self.member_names()).finish()
    }
}

/// Ordered chain of field extensions; applies every member in order.
#[derive(Clone, Default)]
pub struct FieldExtensionChain {
    members: Vec<Arc<dyn FieldExtension>>,
}

impl FieldExtensionChain {
    /// Build a chain from resolved members.
    pub fn new(members: Vec<Arc<dyn FieldExtension>>) -> Self {
        Self { members }
    }
}

impl FieldExtension for FieldExtensionChain {
    fn on_field(&self, ctx: &GenerationContext<'_>, node: &TypeNode<'_>, prop: TsProp) -> TsProp {
        self.members
            .iter()
            .fold(prop, |prop, member| member.on_field(ctx, node, prop))
    }
}

impl fmt::Debug for FieldExtensionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldExtensionChain").field(&self.members.len()).finish()
    }
}

/// Ordered chain of method extensions; applies every member in order.
#[derive(Clone, Default)]
pub struct MethodExtensionChain {
    members: Vec<Arc<dyn MethodExtension>>,
}

impl MethodExtensionChain {
    /// Build a chain from resolved members.
    pub fn new(members: Vec<Arc<dyn MethodExtension>>) -> Self {
        Self { members }
    }
}

impl MethodExtension for MethodExtensionChain {
    fn on_method(
        &self,
        ctx: &GenerationContext<'_>,
        node: &TypeNode<'_>,
        method: TsMethod,
    ) -> TsMethod {
        self.members
            .iter()
            .fold(method, |method, member| member.on_method(ctx, node, method))
    }
}

impl fmt::Debug for MethodExtensionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodExtensionChain").field(&self.members.len()).finish()
    }
}

/// Ordered chain of resource extensions; applies every member, in
/// activation order, for each resource-level hook.
#[derive(Clone, Default)]
pub struct CompositeResourceExtension {
    members: Vec<Arc<dyn GlobalResourceExtension>>,
}

impl CompositeResourceExtension {
    /// Build a composite from resolved members.
    pub fn new(members: Vec<Arc<dyn GlobalResourceExtension>>) -> Self {
        Self { members }
    }

    /// Append an extension to the end of the chain.
    pub fn add(&mut self, ext: Arc<dyn GlobalResourceExtension>) {
        self.members.push(ext);
    }

    /// Member identifiers, in chain order.
    pub fn member_names(&self) -> Vec<&'static str> {
        self.members.iter().map(|m| GlobalResourceExtension::name(m.as_ref())).collect()
    }
}

impl ResourceClassExtension for CompositeResourceExtension {
    fn on_resource_class(
        &self,
        ctx: &GenerationContext<'_>,
        node: &ResourceNode<'_>,
        decl: TsDecl,
    ) -> TsDecl {
        self.members
            .iter()
            .fold(decl, |decl, member| member.on_resource_class(ctx, node, decl))
    }
}

impl ResourceMethodExtension for CompositeResourceExtension {
    fn on_resource_method(
        &self,
        ctx: &GenerationContext<'_>,
        node: &MethodNode<'_>,
        method: TsMethod,
    ) -> TsMethod {
        self.members
            .iter()
            .fold(method, |method, member| member.on_resource_method(ctx, node, method))
    }
}

impl ResponseClassExtension for CompositeResourceExtension {
    fn on_response_class(
        &self,
        ctx: &GenerationContext<'_>,
        node: &MethodNode<'_>,
        decl: TsDecl,
    ) -> TsDecl {
        self.members
            .iter()
            .fold(decl, |decl, member| member.on_response_class(ctx, node, decl))
    }
}

impl ResponseMethodExtension for CompositeResourceExtension {
    fn on_response_method(
        &self,
        ctx: &GenerationContext<'_>,
        node: &ResponseNode<'_>,
        method: TsMethod,
    ) -> TsMethod {
        self.members
            .iter()
            .fold(method, |method, member| member.on_response_method(ctx, node, method))
    }
}

impl GlobalResourceExtension for CompositeResourceExtension {
    fn name(&self) -> &'static str {
        "composite"
    }
}

impl fmt::Debug for CompositeResourceExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompositeResourceExtension").field(&self.member_names()).finish()
    }
}

/// Additive composition of resource class extensions: the default class
/// extension and the per-node resolved one, applied in that order.
#[derive(Clone)]
pub struct ResourceClassChain {
    members: Vec<Arc<dyn ResourceClassExtension>>,
}

impl ResourceClassChain {
    /// Build a chain from its members, applied in order.
    pub fn new(members: Vec<Arc<dyn ResourceClassExtension>>) -> Self {
        Self { members }
    }
}

impl ResourceClassExtension for ResourceClassChain {
    fn on_resource_class(
        &self,
        ctx: &GenerationContext<'_>,
        node: &ResourceNode<'_>,
        decl: TsDecl,
    ) -> TsDecl {
        self.members
            .iter()
            .fold(decl, |decl, member| member.on_resource_class(ctx, node, decl))
    }
}

impl fmt::Debug for ResourceClassChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceClassChain").field(&self.members.len()).finish()
    }
}

/// Everything one logical extension identifier can contribute, by category.
#[derive(Default)]
pub struct ExtensionSet {
    /// Type-level extensions.
    pub type_extensions: Vec<Arc<dyn TypeExtension>>,
    /// Field-level extensions.
    pub field_extensions: Vec<Arc<dyn FieldExtension>>,
    /// Method-level extensions.
    pub method_extensions: Vec<Arc<dyn MethodExtension>>,
    /// Resource-level extensions.
    pub resource_extensions: Vec<Arc<dyn GlobalResourceExtension>>,
}

impl ExtensionSet {
    /// Append every member of `other`, preserving order.
    pub fn merge(&mut self, other: ExtensionSet) {
        self.type_extensions.extend(other.type_extensions);
        self.field_extensions.extend(other.field_extensions);
        self.method_extensions.extend(other.method_extensions);
        self.resource_extensions.extend(other.resource_extensions);
    }
}

impl fmt::Debug for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionSet")
            .field("type", &self.type_extensions.len())
            .field("field", &self.field_extensions.len())
            .field("method", &self.method_extensions.len())
            .field("resource", &self.resource_extensions.len())
            .finish()
    }
}
