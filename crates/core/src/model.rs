//! Read-only API description model.
//!
//! The engine never mutates the description: it is parsed once (serde) and
//! handed to the build by reference. Model nodes come in two flavors that
//! the extension-resolution protocol dispatches on:
//!
//! - *parsed* nodes carry the underlying description declaration, including
//!   its annotation map (extension-point key -> extension identifiers);
//! - *synthetic* nodes are fabricated by the engine (support wrappers,
//!   generated response envelopes) and carry no underlying declaration.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{GenerationError, Result};

/// Annotations attached to a description node: extension-point key mapped
/// to the ordered extension identifiers declared for it.
pub type AnnotationMap = BTreeMap<String, Vec<String>>;

/// Root of a parsed API description.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiModel {
    /// Human-readable title of the API.
    pub title: String,
    /// Description version string.
    #[serde(default)]
    pub version: String,
    /// Declared types, in declaration order.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    /// Declared resources, in declaration order.
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
}

impl ApiModel {
    /// Parse an API description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| GenerationError::Model(format!("failed to parse description: {err}")))
    }

    /// Load an API description from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            GenerationError::Model(format!(
                "failed to read description file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_json(&contents)
    }

    /// Look up a declared type by name.
    pub fn type_named(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// The shape of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A structural object type; gets an interface and a concrete class.
    #[default]
    Object,
    /// A type alias over an existing type expression.
    Alias,
    /// A closed string enumeration.
    Enum,
    /// A raw JSON-schema type, rendered once at the destination root.
    Schema,
}

/// A type declaration in the description.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDecl {
    /// Declared type name.
    pub name: String,
    /// Declaration shape; defaults to `object`.
    #[serde(default)]
    pub kind: TypeKind,
    /// Fields, for object types.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Aliased type expression, for alias types.
    #[serde(default)]
    pub aliased: Option<String>,
    /// Enumeration values, for enum types.
    #[serde(default)]
    pub values: Vec<String>,
    /// Raw schema body, for schema types.
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
    /// Extension annotations declared on this type.
    #[serde(default)]
    pub annotations: AnnotationMap,
}

/// A field of an object type.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,
    /// Referenced type expression; absent when the field declares an
    /// inline type instead.
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    /// Whether the field is required.
    #[serde(default)]
    pub required: bool,
    /// Inline type declaration; the engine turns this into a nested unit
    /// owned by the enclosing type.
    #[serde(default)]
    pub inline: Option<Box<TypeDecl>>,
    /// Extension annotations declared on this field.
    #[serde(default)]
    pub annotations: AnnotationMap,
}

/// A resource (endpoint group) declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDecl {
    /// Resource name.
    pub name: String,
    /// URL path the resource is mounted at.
    pub path: String,
    /// Operations on the resource, in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    /// Extension annotations declared on this resource.
    #[serde(default)]
    pub annotations: AnnotationMap,
}

/// An operation on a resource.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodDecl {
    /// Operation name.
    pub name: String,
    /// HTTP verb, lowercase; defaults to `get`.
    #[serde(default = "default_http")]
    pub http: String,
    /// Request body type expression, if any.
    #[serde(default)]
    pub body: Option<String>,
    /// Declared responses.
    #[serde(default)]
    pub responses: Vec<ResponseDecl>,
    /// Extension annotations declared on this method.
    #[serde(default)]
    pub annotations: AnnotationMap,
}

fn default_http() -> String {
    "get".to_string()
}

/// A declared response of an operation.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseDecl {
    /// HTTP status code.
    pub status: u16,
    /// Response body type expression, if any.
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    /// Extension annotations declared on this response.
    #[serde(default)]
    pub annotations: AnnotationMap,
}

/// A type node as seen by an extension point.
#[derive(Debug, Clone)]
pub enum TypeNode<'a> {
    /// Backed by a declaration in the description.
    Parsed(&'a TypeDecl),
    /// Fabricated by the engine; no underlying declaration.
    Synthetic {
        /// Name of the fabricated type.
        name: String,
    },
}

impl TypeNode<'_> {
    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            TypeNode::Parsed(decl) => &decl.name,
            TypeNode::Synthetic { name } => name,
        }
    }

    /// Annotations, for parsed nodes.
    pub fn annotations(&self) -> Option<&AnnotationMap> {
        match self {
            TypeNode::Parsed(decl) => Some(&decl.annotations),
            TypeNode::Synthetic { .. } => None,
        }
    }
}

/// A resource node as seen by an extension point.
#[derive(Debug, Clone)]
pub enum ResourceNode<'a> {
    /// Backed by a declaration in the description.
    Parsed(&'a ResourceDecl),
    /// Fabricated by the engine.
    Synthetic {
        /// Name of the fabricated resource.
        name: String,
    },
}

impl ResourceNode<'_> {
    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            ResourceNode::Parsed(decl) => &decl.name,
            ResourceNode::Synthetic { name } => name,
        }
    }

    /// Annotations, for parsed nodes.
    pub fn annotations(&self) -> Option<&AnnotationMap> {
        match self {
            ResourceNode::Parsed(decl) => Some(&decl.annotations),
            ResourceNode::Synthetic { .. } => None,
        }
    }
}

/// A method node as seen by an extension point.
#[derive(Debug, Clone)]
pub enum MethodNode<'a> {
    /// Backed by a declaration in the description.
    Parsed(&'a MethodDecl),
    /// Fabricated by the engine.
    Synthetic {
        /// Name of the fabricated method.
        name: String,
    },
}

impl MethodNode<'_> {
    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            MethodNode::Parsed(decl) => &decl.name,
            MethodNode::Synthetic { name } => name,
        }
    }

    /// Annotations, for parsed nodes.
    pub fn annotations(&self) -> Option<&AnnotationMap> {
        match self {
            MethodNode::Parsed(decl) => Some(&decl.annotations),
            MethodNode::Synthetic { .. } => None,
        }
    }
}

/// A response node as seen by an extension point.
#[derive(Debug, Clone)]
pub enum ResponseNode<'a> {
    /// Backed by a declaration in the description.
    Parsed(&'a ResponseDecl),
    /// Fabricated by the engine.
    Synthetic {
        /// Status code of the fabricated response.
        status: u16,
    },
}

impl ResponseNode<'_> {
    /// HTTP status code.
    pub fn status(&self) -> u16 {
        match self {
            ResponseNode::Parsed(decl) => decl.status,
            ResponseNode::Synthetic { status } => *status,
        }
    }

    /// Annotations, for parsed nodes.
    pub fn annotations(&self) -> Option<&AnnotationMap> {
        match self {
            ResponseNode::Parsed(decl) => Some(&decl.annotations),
            ResponseNode::Synthetic { .. } => None,
        }
    }
}
