//! TypeScript declaration AST and code emission.
//!
//! Generator units build structured declarations (interfaces, classes,
//! aliases, const enums) instead of strings; emission to TypeScript source
//! is purely mechanical via the `Emit` trait. Nested declarations are
//! emitted into a declaration-merged `namespace` block following the owner,
//! which is how a nested unit becomes a publicly visible, statically scoped
//! member of its owner.

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

/// Import statement.
#[derive(Debug, Clone)]
pub struct TsImport {
    /// Items to import.
    pub items: Vec<String>,
    /// Module path.
    pub from: String,
    /// Whether this is a type-only import.
    pub type_only: bool,
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        let items = self.items.join(", ");
        let type_keyword = if self.type_only { "type " } else { "" };
        format!("import {}{{ {} }} from \"{}\";\n", type_keyword, items, self.from)
    }
}

/// Object or class property.
#[derive(Debug, Clone)]
pub struct TsProp {
    /// Property name.
    pub name: String,
    /// Property type expression.
    pub ty: String,
    /// Whether the property is optional.
    pub optional: bool,
    /// Whether the property is readonly.
    pub readonly: bool,
    /// Doc comment, if any.
    pub doc: Option<String>,
}

impl TsProp {
    /// A required, writable property with no doc comment.
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
            optional: false,
            readonly: false,
            doc: None,
        }
    }

    fn emit_line(&self) -> String {
        let mut line = String::new();
        if let Some(doc) = &self.doc {
            line.push_str(&format!("/** {doc} */\n"));
        }
        let ro = if self.readonly { "readonly " } else { "" };
        let opt = if self.optional { "?" } else { "" };
        line.push_str(&format!("{}{}{}: {};\n", ro, self.name, opt, self.ty));
        line
    }
}

/// Function parameter.
#[derive(Debug, Clone)]
pub struct TsParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type expression.
    pub ty: String,
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        format!("{}: {}", self.name, self.ty)
    }
}

/// Class method.
#[derive(Debug, Clone)]
pub struct TsMethod {
    /// Method name.
    pub name: String,
    /// Parameters, in order.
    pub params: Vec<TsParam>,
    /// Return type expression.
    pub return_type: String,
    /// Body statements, one line each, unindented.
    pub body: Vec<String>,
    /// Whether the method is async.
    pub is_async: bool,
    /// Whether the method is static.
    pub is_static: bool,
    /// Doc comment, if any.
    pub doc: Option<String>,
}

impl TsMethod {
    /// A plain instance method with no parameters and an empty body.
    pub fn new(name: &str, return_type: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
            return_type: return_type.to_string(),
            body: Vec::new(),
            is_async: false,
            is_static: false,
            doc: None,
        }
    }
}

impl Emit for TsMethod {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(doc) = &self.doc {
            output.push_str(&format!("/** {doc} */\n"));
        }
        let static_str = if self.is_static { "static " } else { "" };
        let async_str = if self.is_async { "async " } else { "" };
        let params = self
            .params
            .iter()
            .map(Emit::emit)
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!(
            "{}{}{}({}): {} {{\n",
            static_str, async_str, self.name, params, self.return_type
        ));
        for line in &self.body {
            output.push_str(&format!("  {line}\n"));
        }
        output.push_str("}\n");
        output
    }
}

/// Declaration body variants.
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// `interface Foo { ... }`
    Interface {
        /// Interface properties.
        properties: Vec<TsProp>,
        /// Extended interfaces.
        extends: Vec<String>,
    },
    /// `class Foo implements Bar { ... }`
    Class {
        /// Implemented interfaces.
        implements: Vec<String>,
        /// Class properties.
        properties: Vec<TsProp>,
        /// Class methods.
        methods: Vec<TsMethod>,
    },
    /// `type Foo = ...`
    Alias {
        /// Aliased type expression.
        ty: String,
    },
    /// `const Foo = { ... } as const; type Foo = ...`
    ConstEnum {
        /// Enumeration string values.
        values: Vec<String>,
    },
    /// Verbatim code for declarations that do not fit the AST.
    Raw {
        /// The code, emitted as-is.
        code: String,
    },
}

/// A single TypeScript declaration, possibly with nested declarations.
#[derive(Debug, Clone)]
pub struct TsDecl {
    /// Declaration name.
    pub name: String,
    /// Declaration body.
    pub kind: DeclKind,
    /// Doc comment, if any.
    pub doc: Option<String>,
    /// Whether the declaration is exported.
    pub exported: bool,
    /// Nested declarations, emitted into a merged namespace block.
    pub nested: Vec<TsDecl>,
}

impl TsDecl {
    /// A new exported declaration with no doc and no nested members.
    pub fn new(name: &str, kind: DeclKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            doc: None,
            exported: true,
            nested: Vec::new(),
        }
    }
}

impl Emit for TsDecl {
    fn emit(&self) -> String {
        let mut output = String::new();

        if let Some(doc) = &self.doc {
            output.push_str("/**\n");
            for line in doc.lines() {
                output.push_str(&format!(" * {line}\n"));
            }
            output.push_str(" */\n");
        }

        let export = if self.exported { "export " } else { "" };

        match &self.kind {
            DeclKind::Interface { properties, extends } => {
                let extends_str = if extends.is_empty() {
                    String::new()
                } else {
                    format!(" extends {}", extends.join(", "))
                };
                output.push_str(&format!("{}interface {}{} {{\n", export, self.name, extends_str));
                for prop in properties {
                    output.push_str(&indent(&prop.emit_line()));
                }
                output.push_str("}\n");
            }
            DeclKind::Class {
                implements,
                properties,
                methods,
            } => {
                let implements_str = if implements.is_empty() {
                    String::new()
                } else {
                    format!(" implements {}", implements.join(", "))
                };
                output.push_str(&format!("{}class {}{} {{\n", export, self.name, implements_str));
                for prop in properties {
                    output.push_str(&indent(&prop.emit_line()));
                }
                for (i, method) in methods.iter().enumerate() {
                    if !properties.is_empty() || i > 0 {
                        output.push('\n');
                    }
                    output.push_str(&indent(&method.emit()));
                }
                output.push_str("}\n");
            }
            DeclKind::Alias { ty } => {
                output.push_str(&format!("{}type {} = {};\n", export, self.name, ty));
            }
            DeclKind::ConstEnum { values } => {
                output.push_str(&format!("{}const {} = {{\n", export, self.name));
                for value in values {
                    output.push_str(&format!("  {}: \"{}\",\n", enum_key(value), value));
                }
                output.push_str("} as const;\n\n");
                output.push_str(&format!(
                    "{}type {} = (typeof {})[keyof typeof {}];\n",
                    export, self.name, self.name, self.name
                ));
            }
            DeclKind::Raw { code } => {
                output.push_str(code);
                if !code.ends_with('\n') {
                    output.push('\n');
                }
            }
        }

        if !self.nested.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}namespace {} {{\n", export, self.name));
            for (i, nested) in self.nested.iter().enumerate() {
                if i > 0 {
                    output.push('\n');
                }
                output.push_str(&indent(&nested.emit()));
            }
            output.push_str("}\n");
        }

        output
    }
}

/// A complete TypeScript source file.
#[derive(Debug, Clone)]
pub struct TsFile {
    /// Import statements.
    pub imports: Vec<TsImport>,
    /// The file's declaration.
    pub decl: TsDecl,
}

impl TsFile {
    /// A file with no imports.
    pub fn plain(decl: TsDecl) -> Self {
        Self {
            imports: Vec::new(),
            decl,
        }
    }
}

impl Emit for TsFile {
    fn emit(&self) -> String {
        let mut output = String::new();
        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }
        output.push_str(&self.decl.emit());
        output
    }
}

/// Indent every non-empty line of a block by two spaces.
fn indent(block: &str) -> String {
    block
        .lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_string()
            } else {
                format!("  {line}\n")
            }
        })
        .collect()
}

/// Turn an enum string value into a const-object key.
fn enum_key(value: &str) -> String {
    let mut key = String::new();
    for (i, c) in value.chars().enumerate() {
        if c.is_ascii_alphanumeric() {
            if i == 0 {
                key.extend(c.to_uppercase());
            } else {
                key.push(c);
            }
        } else {
            key.push('_');
        }
    }
    if key.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        key.insert(0, '_');
    }
    key
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_interface() {
        let decl = TsDecl::new(
            "Pet",
            DeclKind::Interface {
                properties: vec![
                    TsProp::new("id", "string"),
                    TsProp {
                        optional: true,
                        ..TsProp::new("tag", "string")
                    },
                ],
                extends: vec![],
            },
        );
        assert_eq!(decl.emit(), "export interface Pet {\n  id: string;\n  tag?: string;\n}\n");
    }

    #[test]
    fn test_emit_readonly_prop() {
        let prop = TsProp {
            readonly: true,
            ..TsProp::new("id", "string")
        };
        assert_eq!(prop.emit_line(), "readonly id: string;\n");
    }

    #[test]
    fn test_emit_alias() {
        let decl = TsDecl::new("PetId", DeclKind::Alias { ty: "string".to_string() });
        assert_eq!(decl.emit(), "export type PetId = string;\n");
    }

    #[test]
    fn test_emit_const_enum() {
        let decl = TsDecl::new(
            "PetKind",
            DeclKind::ConstEnum {
                values: vec!["cat".to_string(), "long-hair".to_string()],
            },
        );
        let code = decl.emit();
        assert!(code.contains("export const PetKind = {"));
        assert!(code.contains("Cat: \"cat\","));
        assert!(code.contains("Long_hair: \"long-hair\","));
        assert!(code.contains("export type PetKind = (typeof PetKind)[keyof typeof PetKind];"));
    }

    #[test]
    fn test_emit_class_with_method() {
        let decl = TsDecl::new(
            "PetImpl",
            DeclKind::Class {
                implements: vec!["Pet".to_string()],
                properties: vec![TsProp::new("id", "string")],
                methods: vec![TsMethod {
                    body: vec!["return { id: this.id };".to_string()],
                    ..TsMethod::new("toJSON", "Pet")
                }],
            },
        );
        let code = decl.emit();
        assert!(code.contains("export class PetImpl implements Pet {"));
        assert!(code.contains("  id: string;"));
        assert!(code.contains("  toJSON(): Pet {"));
        assert!(code.contains("    return { id: this.id };"));
    }

    #[test]
    fn test_emit_nested_namespace() {
        let mut decl = TsDecl::new(
            "Pet",
            DeclKind::Interface {
                properties: vec![TsProp::new("home", "Pet.Address")],
                extends: vec![],
            },
        );
        decl.nested.push(TsDecl::new(
            "Address",
            DeclKind::Interface {
                properties: vec![TsProp::new("street", "string")],
                extends: vec![],
            },
        ));
        let code = decl.emit();
        assert!(code.contains("export namespace Pet {"));
        assert!(code.contains("  export interface Address {"));
        assert!(code.contains("    street: string;"));
    }

    #[test]
    fn test_emit_imports() {
        let file = TsFile {
            imports: vec![TsImport {
                items: vec!["ApiError".to_string()],
                from: "../support/ApiError".to_string(),
                type_only: false,
            }],
            decl: TsDecl::new("X", DeclKind::Alias { ty: "string".to_string() }),
        };
        let code = file.emit();
        assert!(code.starts_with("import { ApiError } from \"../support/ApiError\";\n\n"));
    }
}
