//! Built-in extensions and the compile-time factory map.
//!
//! Each recognized identifier maps to a constructor at compile time; the
//! same map backs configuration tag activation and direct identifier
//! resolution. An identifier may contribute to more than one chain:
//! `validation` feeds both the type chain and the resource chain.

use std::sync::Arc;

use crate::engine::extension::{
    ExtensionSet, GlobalResourceExtension, ResourceClassExtension, ResourceMethodExtension,
    ResponseClassExtension, ResponseMethodExtension, TypeExtension,
};
use crate::engine::units::Phase;
use crate::engine::GenerationContext;
use crate::model::{ResourceNode, TypeNode};
use crate::ts::{DeclKind, TsDecl, TsMethod, TsParam};

/// Look up the built-in constructor for a recognized identifier.
pub fn builtin(id: &str) -> Option<fn() -> ExtensionSet> {
    match id {
        "jsdoc" => Some(jsdoc),
        "readonly" => Some(readonly),
        "validation" => Some(validation),
        _ => None,
    }
}

fn jsdoc() -> ExtensionSet {
    ExtensionSet {
        type_extensions: vec![Arc::new(JsDocExtension)],
        ..ExtensionSet::default()
    }
}

fn readonly() -> ExtensionSet {
    ExtensionSet {
        type_extensions: vec![Arc::new(ReadonlyExtension)],
        ..ExtensionSet::default()
    }
}

fn validation() -> ExtensionSet {
    ExtensionSet {
        type_extensions: vec![Arc::new(ValidationExtension)],
        resource_extensions: vec![Arc::new(ValidationExtension)],
        ..ExtensionSet::default()
    }
}

/// Attaches a generated-from doc comment to declarations that have none.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsDocExtension;

impl TypeExtension for JsDocExtension {
    fn name(&self) -> &'static str {
        "jsdoc"
    }

    fn on_type(
        &self,
        _ctx: &GenerationContext<'_>,
        node: &TypeNode<'_>,
        mut decl: TsDecl,
        _phase: Phase,
    ) -> TsDecl {
        if decl.doc.is_none() {
            decl.doc = Some(format!("Generated from the `{}` declaration.", node.name()));
        }
        decl
    }
}

/// Marks every interface property readonly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadonlyExtension;

impl TypeExtension for ReadonlyExtension {
    fn name(&self) -> &'static str {
        "readonly"
    }

    fn on_type(
        &self,
        _ctx: &GenerationContext<'_>,
        _node: &TypeNode<'_>,
        mut decl: TsDecl,
        _phase: Phase,
    ) -> TsDecl {
        if let DeclKind::Interface { properties, .. } = &mut decl.kind {
            for prop in properties {
                prop.readonly = true;
            }
        }
        decl
    }
}

/// Adds runtime required-field checks: a `validate` method on type
/// implementation classes and a `validatePayload` guard on resource
/// classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationExtension;

impl TypeExtension for ValidationExtension {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn on_type(
        &self,
        _ctx: &GenerationContext<'_>,
        node: &TypeNode<'_>,
        mut decl: TsDecl,
        phase: Phase,
    ) -> TsDecl {
        if phase != Phase::Implementation {
            return decl;
        }
        if let DeclKind::Class { methods, .. } = &mut decl.kind {
            let mut body = vec!["const problems: string[] = [];".to_string()];
            if let TypeNode::Parsed(type_decl) = node {
                for field in type_decl.fields.iter().filter(|f| f.required) {
                    body.push(format!(
                        "if (this.{0} === undefined || this.{0} === null) problems.push(\"{0} is required\");",
                        field.name
                    ));
                }
            }
            body.push("return problems;".to_string());
            methods.push(TsMethod {
                body,
                doc: Some("Checks required fields and returns the problems found.".to_string()),
                ..TsMethod::new("validate", "string[]")
            });
        }
        decl
    }
}

impl ResourceClassExtension for ValidationExtension {
    fn on_resource_class(
        &self,
        _ctx: &GenerationContext<'_>,
        _node: &ResourceNode<'_>,
        mut decl: TsDecl,
    ) -> TsDecl {
        if let DeclKind::Class { methods, .. } = &mut decl.kind {
            methods.push(TsMethod {
                params: vec![TsParam {
                    name: "payload".to_string(),
                    ty: "unknown".to_string(),
                }],
                body: vec![
                    "if (payload === undefined || payload === null) return [\"payload is required\"];".to_string(),
                    "return [];".to_string(),
                ],
                is_static: true,
                doc: Some("Guards a request payload before dispatch.".to_string()),
                ..TsMethod::new("validatePayload", "string[]")
            });
        }
        decl
    }
}

impl ResourceMethodExtension for ValidationExtension {}
impl ResponseClassExtension for ValidationExtension {}
impl ResponseMethodExtension for ValidationExtension {}

impl GlobalResourceExtension for ValidationExtension {
    fn name(&self) -> &'static str {
        "validation"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::engine::registry::{ExtensionRegistry, NoExtensionManager};
    use crate::engine::ModelIndex;
    use crate::model::ApiModel;
    use crate::ts::TsProp;

    fn fixtures() -> (ApiModel, Configuration, ModelIndex, ExtensionRegistry) {
        let api = ApiModel::from_json(r#"{ "title": "Test" }"#).unwrap();
        let config = Configuration::default();
        let index = ModelIndex::new();
        let registry = ExtensionRegistry::from_configuration(&config, Arc::new(NoExtensionManager));
        (api, config, index, registry)
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin("jsdoc").is_some());
        assert!(builtin("readonly").is_some());
        assert!(builtin("validation").is_some());
        assert!(builtin("jackson").is_none());
    }

    #[test]
    fn test_validation_contributes_to_both_chains() {
        let set = validation();
        assert_eq!(set.type_extensions.len(), 1);
        assert_eq!(set.resource_extensions.len(), 1);
    }

    #[test]
    fn test_jsdoc_attaches_doc() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);
        let node = TypeNode::Synthetic {
            name: "Pet".to_string(),
        };
        let decl = TsDecl::new(
            "Pet",
            DeclKind::Interface {
                properties: vec![],
                extends: vec![],
            },
        );
        let decl = JsDocExtension.on_type(&ctx, &node, decl, Phase::Interface);
        assert_eq!(decl.doc.as_deref(), Some("Generated from the `Pet` declaration."));
    }

    #[test]
    fn test_readonly_marks_interface_props() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);
        let node = TypeNode::Synthetic {
            name: "Pet".to_string(),
        };
        let decl = TsDecl::new(
            "Pet",
            DeclKind::Interface {
                properties: vec![TsProp::new("id", "string")],
                extends: vec![],
            },
        );
        let decl = ReadonlyExtension.on_type(&ctx, &node, decl, Phase::Interface);
        let DeclKind::Interface { properties, .. } = &decl.kind else {
            unreachable!("extension must preserve the declaration kind");
        };
        assert!(properties[0].readonly);
    }

    #[test]
    fn test_validation_adds_method_on_implementation_phase_only() {
        let (api, config, index, registry) = fixtures();
        let ctx = GenerationContext::new(&api, &config, &index, &registry);
        let node = TypeNode::Synthetic {
            name: "Pet".to_string(),
        };
        let class = TsDecl::new(
            "PetImpl",
            DeclKind::Class {
                implements: vec![],
                properties: vec![],
                methods: vec![],
            },
        );

        let untouched =
            ValidationExtension.on_type(&ctx, &node, class.clone(), Phase::Interface);
        let DeclKind::Class { methods, .. } = &untouched.kind else {
            unreachable!("extension must preserve the declaration kind");
        };
        assert!(methods.is_empty());

        let extended = ValidationExtension.on_type(&ctx, &node, class, Phase::Implementation);
        let DeclKind::Class { methods, .. } = &extended.kind else {
            unreachable!("extension must preserve the declaration kind");
        };
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "validate");
    }
}
