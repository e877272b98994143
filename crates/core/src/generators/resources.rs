//! Resource client units.
//!
//! Each resource renders once into a `{Name}Client` class under the
//! resource namespace: one async fetch method per declared operation plus
//! a nested response wrapper class per operation that declares responses.
//! Resource clients depend on the shared support artifacts (`ApiError`).

use std::sync::Arc;

use crate::engine::annotations::{
    ON_RESOURCE_CLASS_CREATION, ON_RESOURCE_CLASS_FINISH, ON_RESOURCE_METHOD_CREATION,
    ON_RESOURCE_METHOD_FINISH, ON_RESPONSE_CLASS_CREATION, ON_RESPONSE_METHOD_CREATION,
};
use crate::engine::construct::GeneratorCandidate;
use crate::engine::emit::package_path;
use crate::engine::extension::{NoOpExtension, ResourceClassExtension};
use crate::engine::units::ResourceRender;
use crate::engine::GenerationContext;
use crate::error::Result;
use crate::generators::{capitalize, ts_type};
use crate::model::{MethodDecl, MethodNode, ResourceDecl, ResourceNode, ResponseNode};
use crate::ts::{DeclKind, TsDecl, TsFile, TsImport, TsMethod, TsParam, TsProp};

/// Resource unit rendering one client class.
#[derive(Debug)]
pub struct ResourceClientUnit {
    decl: ResourceDecl,
}

impl ResourceClientUnit {
    /// A unit for the given resource declaration.
    pub fn new(decl: ResourceDecl) -> Self {
        Self { decl }
    }

    fn class_skeleton(&self) -> TsDecl {
        let class_name = format!("{}Client", self.decl.name);
        let at = TsMethod {
            params: vec![TsParam {
                name: "baseUrl".to_string(),
                ty: "string".to_string(),
            }],
            body: vec![format!(
                "return Object.assign(new {class_name}(), {{ baseUrl }});"
            )],
            is_static: true,
            ..TsMethod::new("at", &class_name)
        };
        TsDecl::new(
            &class_name,
            DeclKind::Class {
                implements: vec![],
                properties: vec![TsProp::new("baseUrl", "string")],
                methods: vec![at],
            },
        )
    }

    fn fetch_method(&self, method: &MethodDecl) -> TsMethod {
        let verb = method.http.to_uppercase();
        let path = &self.decl.path;
        let ok_ty = method
            .responses
            .iter()
            .find(|r| (200..300).contains(&r.status))
            .and_then(|r| r.ty.as_deref())
            .map(ts_type);
        let ret_inner = ok_ty.clone().unwrap_or_else(|| "void".to_string());

        let mut params = Vec::new();
        if let Some(body_ty) = &method.body {
            params.push(TsParam {
                name: "payload".to_string(),
                ty: ts_type(body_ty),
            });
        }

        let mut body = Vec::new();
        if method.body.is_some() {
            body.push(format!(
                "const res = await fetch(`${{this.baseUrl}}{path}`, {{ method: \"{verb}\", headers: {{ \"content-type\": \"application/json\" }}, body: JSON.stringify(payload) }});"
            ));
        } else if verb == "GET" {
            body.push(format!("const res = await fetch(`${{this.baseUrl}}{path}`);"));
        } else {
            body.push(format!(
                "const res = await fetch(`${{this.baseUrl}}{path}`, {{ method: \"{verb}\" }});"
            ));
        }
        body.push("if (!res.ok) {".to_string());
        body.push("  throw new ApiError(res.status, await res.text());".to_string());
        body.push("}".to_string());
        if ok_ty.is_some() {
            body.push(format!("return (await res.json()) as {ret_inner};"));
        } else {
            body.push("return;".to_string());
        }

        TsMethod {
            params,
            body,
            is_async: true,
            ..TsMethod::new(&method.name, &format!("Promise<{ret_inner}>"))
        }
    }

    fn response_wrapper(
        &self,
        ctx: &GenerationContext<'_>,
        method: &MethodDecl,
        node: &MethodNode<'_>,
    ) -> Result<TsDecl> {
        let wrapper_name = format!("{}Response", capitalize(&method.name));

        let mut body_types: Vec<String> = Vec::new();
        let mut factories = Vec::new();
        for response in &method.responses {
            let response_node = ResponseNode::Parsed(response);
            let body_ty = response.ty.as_deref().map(ts_type);
            if let Some(ty) = &body_ty {
                if !body_types.contains(ty) {
                    body_types.push(ty.clone());
                }
            }

            let (params, line) = match &body_ty {
                Some(ty) => (
                    vec![TsParam {
                        name: "body".to_string(),
                        ty: ty.clone(),
                    }],
                    format!(
                        "return Object.assign(new {wrapper_name}(), {{ status: {}, body }});",
                        response.status
                    ),
                ),
                None => (
                    vec![],
                    format!(
                        "return Object.assign(new {wrapper_name}(), {{ status: {} }});",
                        response.status
                    ),
                ),
            };
            let factory = TsMethod {
                params,
                body: vec![line],
                is_static: true,
                ..TsMethod::new(&format!("respond{}", response.status), &wrapper_name)
            };
            let factory = ctx
                .response_method_extension(ON_RESPONSE_METHOD_CREATION, &response_node)?
                .on_response_method(ctx, &response_node, factory);
            factories.push(factory);
        }

        let mut properties = vec![TsProp::new("status", "number")];
        if !body_types.is_empty() {
            properties.push(TsProp {
                optional: true,
                ..TsProp::new("body", &body_types.join(" | "))
            });
        }

        let wrapper = TsDecl::new(
            &wrapper_name,
            DeclKind::Class {
                implements: vec![],
                properties,
                methods: factories,
            },
        );
        Ok(ctx
            .response_class_extension(ON_RESPONSE_CLASS_CREATION, node)?
            .on_response_class(ctx, node, wrapper))
    }

    fn support_import(ctx: &GenerationContext<'_>) -> TsImport {
        let depth = package_path(ctx.resource_package()).components().count();
        let ups = "../".repeat(depth);
        let support = ctx
            .support_package()
            .split('.')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        TsImport {
            items: vec!["ApiError".to_string()],
            from: format!("{ups}{support}/ApiError"),
            type_only: false,
        }
    }
}

impl ResourceRender for ResourceClientUnit {
    fn render(&self, ctx: &GenerationContext<'_>) -> Result<TsFile> {
        let node = ResourceNode::Parsed(&self.decl);

        let default: Arc<dyn ResourceClassExtension> =
            Arc::new(ctx.registry().resource_listeners().clone());
        let creation = ctx.resource_class_extension(default, ON_RESOURCE_CLASS_CREATION, &node)?;
        let mut decl = creation.on_resource_class(ctx, &node, self.class_skeleton());

        for method in &self.decl.methods {
            let method_node = MethodNode::Parsed(method);

            let fetch = self.fetch_method(method);
            let fetch = ctx
                .resource_method_extension(ON_RESOURCE_METHOD_CREATION, &method_node)?
                .on_resource_method(ctx, &method_node, fetch);
            let fetch = ctx
                .resource_method_extension(ON_RESOURCE_METHOD_FINISH, &method_node)?
                .on_resource_method(ctx, &method_node, fetch);
            if let DeclKind::Class { methods, .. } = &mut decl.kind {
                methods.push(fetch);
            }

            if !method.responses.is_empty() {
                let wrapper = self.response_wrapper(ctx, method, &method_node)?;
                decl.nested.push(wrapper);
            }
        }

        let finish = ctx.resource_class_extension(
            Arc::new(NoOpExtension),
            ON_RESOURCE_CLASS_FINISH,
            &node,
        )?;
        let decl = finish.on_resource_class(ctx, &node, decl);

        Ok(TsFile {
            imports: vec![Self::support_import(ctx)],
            decl,
        })
    }
}

/// Candidate that registers a resource client unit.
#[derive(Debug)]
pub struct ResourceCandidate {
    decl: ResourceDecl,
}

impl ResourceCandidate {
    /// A candidate for the given resource declaration.
    pub fn new(decl: ResourceDecl) -> Self {
        Self { decl }
    }
}

impl GeneratorCandidate for ResourceCandidate {
    fn construct(&self, ctx: &GenerationContext<'_>) -> Result<()> {
        ctx.index()
            .register_resource(Arc::new(ResourceClientUnit::new(self.decl.clone())));
        Ok(())
    }
}
