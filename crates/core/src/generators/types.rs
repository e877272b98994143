//! Tree and flat units for declared types.
//!
//! Object types are tree units rendered in both phases: an interface for
//! the interface phase and a concrete `{Name}Impl` class for the
//! implementation phase. Inline field declarations become nested tree
//! units owned by the enclosing type. Raw schema types are flat units:
//! their schema body is staged into the build's scratch directory during
//! construction and rendered once, straight to the destination root.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::engine::annotations::{ON_FIELD_CREATION, ON_METHOD_CREATION, ON_TYPE_CREATION};
use crate::engine::construct::GeneratorCandidate;
use crate::engine::extension::TypeExtension;
use crate::engine::units::{FlatRender, GeneratorUnit, Phase, RenderedFile, TreeRender};
use crate::engine::GenerationContext;
use crate::error::{GenerationError, Result};
use crate::generators::ts_type;
use crate::model::{TypeDecl, TypeKind, TypeNode};
use crate::ts::{DeclKind, Emit, TsDecl, TsMethod, TsProp};

/// Tree unit for one declared (or inline) type.
#[derive(Debug)]
pub struct TypeTreeUnit {
    decl: TypeDecl,
    owner: Option<String>,
}

impl TypeTreeUnit {
    /// A unit for a top-level type declaration.
    pub fn new(decl: TypeDecl) -> Self {
        Self { decl, owner: None }
    }

    /// A unit for an inline declaration nested inside `owner`.
    pub fn nested(decl: TypeDecl, owner: &str) -> Self {
        Self {
            decl,
            owner: Some(owner.to_string()),
        }
    }

    /// The interface name as referenced from outside the owner, e.g.
    /// `Pet.Address` for a nested declaration.
    fn qualified_interface(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.decl.name),
            None => self.decl.name.clone(),
        }
    }

    fn render_interface(&self, ctx: &GenerationContext<'_>, node: &TypeNode<'_>) -> Result<TsDecl> {
        let field_ext = ctx.field_extension(ON_FIELD_CREATION, node)?;
        let mut properties = Vec::new();
        for field in &self.decl.fields {
            let ty = match &field.inline {
                Some(inline) => format!("{}.{}", self.decl.name, inline.name),
                None => ts_type(field.ty.as_deref().unwrap_or("any")),
            };
            let prop = TsProp {
                optional: !field.required,
                ..TsProp::new(&field.name, &ty)
            };
            properties.push(field_ext.on_field(ctx, node, prop));
        }
        Ok(TsDecl::new(
            &self.decl.name,
            DeclKind::Interface {
                properties,
                extends: vec![],
            },
        ))
    }

    fn render_implementation(
        &self,
        ctx: &GenerationContext<'_>,
        node: &TypeNode<'_>,
    ) -> Result<TsDecl> {
        let interface = self.qualified_interface();
        let field_ext = ctx.field_extension(ON_FIELD_CREATION, node)?;

        let mut properties = Vec::new();
        for field in &self.decl.fields {
            let ty = match &field.inline {
                Some(inline) => format!("{}.{}", self.decl.name, inline.name),
                None => ts_type(field.ty.as_deref().unwrap_or("any")),
            };
            let prop = TsProp {
                optional: !field.required,
                ..TsProp::new(&field.name, &ty)
            };
            properties.push(field_ext.on_field(ctx, node, prop));
        }

        let mut body = vec!["return {".to_string()];
        for field in &self.decl.fields {
            body.push(format!("  {0}: this.{0},", field.name));
        }
        body.push("};".to_string());
        let to_json = TsMethod {
            body,
            ..TsMethod::new("toJSON", &interface)
        };
        let to_json = ctx
            .method_extension(ON_METHOD_CREATION, node)?
            .on_method(ctx, node, to_json);

        Ok(TsDecl::new(
            &format!("{}Impl", self.decl.name),
            DeclKind::Class {
                implements: vec![interface],
                properties,
                methods: vec![to_json],
            },
        ))
    }
}

impl TreeRender for TypeTreeUnit {
    fn render(&self, ctx: &GenerationContext<'_>, phase: Phase) -> Result<TsDecl> {
        let node = TypeNode::Parsed(&self.decl);

        let decl = match (self.decl.kind, phase) {
            (TypeKind::Object, Phase::Interface) => self.render_interface(ctx, &node)?,
            (TypeKind::Object, Phase::Implementation) => self.render_implementation(ctx, &node)?,
            (TypeKind::Alias | TypeKind::Schema, _) => TsDecl::new(
                &self.decl.name,
                DeclKind::Alias {
                    ty: ts_type(self.decl.aliased.as_deref().unwrap_or("any")),
                },
            ),
            (TypeKind::Enum, _) => TsDecl::new(
                &self.decl.name,
                DeclKind::ConstEnum {
                    values: self.decl.values.clone(),
                },
            ),
        };

        // Activated chain first, then the per-node resolved extension.
        let decl = ctx.registry().type_listeners().on_type(ctx, &node, decl, phase);
        let decl = ctx
            .type_extension(ON_TYPE_CREATION, &node)?
            .on_type(ctx, &node, decl, phase);
        Ok(decl)
    }
}

/// Flat unit for a raw schema type staged during construction.
#[derive(Debug)]
pub struct SchemaFlatUnit {
    name: String,
    staged: PathBuf,
}

impl FlatRender for SchemaFlatUnit {
    fn render(&self, _ctx: &GenerationContext<'_>) -> Result<Vec<RenderedFile>> {
        let schema = fs::read_to_string(&self.staged)?;
        let name = &self.name;
        let code = format!(
            "export const {name}Schema = {} as const;\n\nexport type {name} = Record<string, unknown>;\n",
            schema.trim_end()
        );
        let decl = TsDecl {
            doc: Some(format!("Generated from the `{name}` JSON schema.")),
            ..TsDecl::new(name, DeclKind::Raw { code })
        };
        Ok(vec![RenderedFile {
            relative_path: PathBuf::from(format!("{name}.ts")),
            contents: decl.emit(),
        }])
    }
}

/// Candidate that registers the units for one declared type.
#[derive(Debug)]
pub struct TypeCandidate {
    decl: TypeDecl,
}

impl TypeCandidate {
    /// A candidate for the given declaration.
    pub fn new(decl: TypeDecl) -> Self {
        Self { decl }
    }
}

impl GeneratorCandidate for TypeCandidate {
    fn construct(&self, ctx: &GenerationContext<'_>) -> Result<()> {
        let decl = &self.decl;
        match decl.kind {
            TypeKind::Object => {
                let handle = ctx
                    .index()
                    .register_tree(Arc::new(TypeTreeUnit::new(decl.clone())));
                ctx.index()
                    .register_type(&decl.name, GeneratorUnit::Tree(handle.clone()));
                ctx.index().mark_implementation(handle.id);

                for field in &decl.fields {
                    if let Some(inline) = &field.inline {
                        let child = ctx.index().register_tree(Arc::new(TypeTreeUnit::nested(
                            (**inline).clone(),
                            &decl.name,
                        )));
                        ctx.index().register_nested(handle.id, child.id);
                    }
                }
            }
            TypeKind::Alias | TypeKind::Enum => {
                let handle = ctx
                    .index()
                    .register_tree(Arc::new(TypeTreeUnit::new(decl.clone())));
                ctx.index()
                    .register_type(&decl.name, GeneratorUnit::Tree(handle));
            }
            TypeKind::Schema => {
                let staging = ctx.index().schema_staging()?;
                let staged = staging.join(format!("{}.schema.json", decl.name));
                let body = serde_json::to_string_pretty(
                    decl.schema.as_ref().unwrap_or(&Value::Null),
                )
                .map_err(|err| {
                    GenerationError::Model(format!(
                        "schema body of `{}` is not serializable: {err}",
                        decl.name
                    ))
                })?;
                fs::write(&staged, body)?;
                ctx.index().register_type(
                    &decl.name,
                    GeneratorUnit::Flat(Arc::new(SchemaFlatUnit {
                        name: decl.name.clone(),
                        staged,
                    })),
                );
            }
        }
        Ok(())
    }
}
