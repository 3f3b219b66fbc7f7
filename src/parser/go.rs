//! Lowering of tree-sitter-go syntax trees into the [`SourceFile`] model.

use std::path::Path;
use tree_sitter::{Node, Parser};

use super::syntax::{
    Decl, FieldType, FuncDecl, IdentUse, ImportSpec, InterfaceMember, Param, Signature,
    SourceFile, StructField, TypeShape, TypeSpec, ValueSpec,
};
use crate::error::{GodepError, Result};

/// Parse Go source text and lower it into a [`SourceFile`].
///
/// A tree with syntax errors is rejected so callers can skip the file.
pub fn lower_file(path: &Path, source: &str) -> Result<SourceFile> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_go::LANGUAGE.into())?;

    let tree = parser.parse(source, None).ok_or_else(|| GodepError::Parse {
        path: path.to_path_buf(),
        reason: "parser produced no tree".to_string(),
    })?;
    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(root).map_or(0, |node| node.start_position().row + 1);
        return Err(GodepError::Parse {
            path: path.to_path_buf(),
            reason: format!("syntax error near line {line}"),
        });
    }

    let lowering = Lowering {
        source: source.as_bytes(),
    };
    let mut file = SourceFile {
        path: path.to_path_buf(),
        ..SourceFile::default()
    };

    for node in named_children(root) {
        match node.kind() {
            "comment" => {
                let comment = lowering.raw(node);
                if file.package.is_empty()
                    && file.build_constraint.is_none()
                    && is_go_build(comment)
                {
                    file.build_constraint = Some(comment.trim_end().to_string());
                }
            }
            "package_clause" => {
                if let Some(name) = named_children(node).into_iter().next() {
                    file.package = lowering.text(name);
                }
            }
            "import_declaration" => {
                for spec in specs(node, &["import_spec"]) {
                    if let Some(import) = lowering.import_spec(spec) {
                        file.imports.push(import);
                    }
                }
            }
            "type_declaration" => {
                for spec in specs(node, &["type_spec", "type_alias"]) {
                    if let Some(decl) = lowering.type_spec(spec) {
                        file.decls.push(Decl::Type(decl));
                    }
                }
            }
            "var_declaration" | "const_declaration" => {
                for spec in specs(node, &["var_spec", "const_spec"]) {
                    file.decls.push(Decl::Value(lowering.value_spec(spec)));
                }
            }
            "function_declaration" | "method_declaration" => {
                if let Some(decl) = lowering.func_decl(node) {
                    file.decls.push(Decl::Func(decl));
                }
            }
            _ => {}
        }
    }

    file.uses = lowering.ident_uses(root);
    Ok(file)
}

/// Whether a comment is a `//go:build` constraint line.
fn is_go_build(comment: &str) -> bool {
    comment
        .strip_prefix("//go:build")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Specs of the given kinds directly under a declaration or inside its
/// parenthesised `*_list` group.
fn specs<'t>(node: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    for child in named_children(node) {
        if kinds.contains(&child.kind()) {
            found.push(child);
        } else if child.kind().ends_with("_list") {
            found.extend(
                named_children(child)
                    .into_iter()
                    .filter(|grand| kinds.contains(&grand.kind())),
            );
        }
    }
    found
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

struct Lowering<'a> {
    source: &'a [u8],
}

impl<'a> Lowering<'a> {
    fn raw(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.source).unwrap_or_default()
    }

    /// Node text with whitespace runs collapsed to single spaces.
    fn text(&self, node: Node<'_>) -> String {
        self.raw(node).split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field).map(|child| self.text(child))
    }

    fn import_spec(&self, node: Node<'_>) -> Option<ImportSpec> {
        let path = self.field_text(node, "path")?;
        Some(ImportSpec {
            alias: self.field_text(node, "name"),
            path: path.trim_matches(|c| c == '"' || c == '`').to_string(),
        })
    }

    fn type_spec(&self, node: Node<'_>) -> Option<TypeSpec> {
        let name = self.field_text(node, "name")?;
        let ty = node.child_by_field_name("type")?;
        let shape = match ty.kind() {
            "interface_type" => TypeShape::Interface(self.interface_members(ty)),
            "struct_type" => TypeShape::Struct(self.struct_fields(ty)),
            _ => TypeShape::Other(self.text(ty)),
        };
        Some(TypeSpec { name, shape })
    }

    fn interface_members(&self, node: Node<'_>) -> Vec<InterfaceMember> {
        named_children(node)
            .into_iter()
            .filter_map(|member| match member.kind() {
                "comment" => None,
                "method_elem" | "method_spec" => Some(InterfaceMember::Method {
                    name: self.field_text(member, "name")?,
                    signature: self.signature(member),
                }),
                _ => Some(InterfaceMember::Embedded(self.text(member))),
            })
            .collect()
    }

    fn struct_fields(&self, node: Node<'_>) -> Vec<StructField> {
        let Some(list) = named_children(node)
            .into_iter()
            .find(|child| child.kind() == "field_declaration_list")
        else {
            return Vec::new();
        };

        named_children(list)
            .into_iter()
            .filter(|field| field.kind() == "field_declaration")
            .filter_map(|field| {
                let mut cursor = field.walk();
                let names = field
                    .children_by_field_name("name", &mut cursor)
                    .filter(|name| name.is_named())
                    .map(|name| self.text(name))
                    .collect();
                let ty = field.child_by_field_name("type")?;
                let ty = if ty.kind() == "function_type" {
                    FieldType::Func(self.signature(ty))
                } else {
                    FieldType::Expr(self.text(ty))
                };
                Some(StructField { names, ty })
            })
            .collect()
    }

    fn value_spec(&self, node: Node<'_>) -> ValueSpec {
        let mut cursor = node.walk();
        let names = node
            .children_by_field_name("name", &mut cursor)
            .filter(|name| name.is_named())
            .map(|name| self.text(name))
            .collect();
        let values = node
            .child_by_field_name("value")
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .filter(|value| value.kind() != "comment")
                    .map(|value| self.text(value))
                    .collect()
            })
            .unwrap_or_default();
        ValueSpec { names, values }
    }

    fn func_decl(&self, node: Node<'_>) -> Option<FuncDecl> {
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| {
                named_children(list)
                    .into_iter()
                    .find(|param| param.kind() == "parameter_declaration")
            })
            .and_then(|param| self.field_text(param, "type"));

        Some(FuncDecl {
            name: self.field_text(node, "name")?,
            receiver,
            signature: self.signature(node),
        })
    }

    /// Signature from a node carrying `parameters` and `result` fields.
    fn signature(&self, node: Node<'_>) -> Signature {
        let params = node
            .child_by_field_name("parameters")
            .map(|list| self.params(list))
            .unwrap_or_default();
        let results = match node.child_by_field_name("result") {
            Some(list) if list.kind() == "parameter_list" => self.params(list),
            Some(ty) => vec![Param::unnamed(self.text(ty))],
            None => Vec::new(),
        };
        Signature { params, results }
    }

    fn params(&self, list: Node<'_>) -> Vec<Param> {
        named_children(list)
            .into_iter()
            .filter_map(|param| {
                let ty = self.field_text(param, "type")?;
                let mut cursor = param.walk();
                let names = param
                    .children_by_field_name("name", &mut cursor)
                    .filter(|name| name.is_named())
                    .count();
                match param.kind() {
                    "parameter_declaration" => Some(Param::new(names, ty)),
                    "variadic_parameter_declaration" => Some(Param::new(names, format!("...{ty}"))),
                    _ => None,
                }
            })
            .collect()
    }

    /// Every identifier occurrence with the selector qualifier that precedes it.
    fn ident_uses(&self, root: Node<'_>) -> Vec<IdentUse> {
        let mut uses = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if matches!(
                node.kind(),
                "identifier" | "type_identifier" | "field_identifier" | "package_identifier"
            ) {
                let name = self.text(node);
                uses.push(match self.qualifier(node) {
                    Some(qualifier) => IdentUse::qualified(qualifier, name),
                    None => IdentUse::bare(name),
                });
                continue;
            }
            let mut children = named_children(node);
            children.reverse();
            stack.extend(children);
        }

        uses
    }

    fn qualifier(&self, node: Node<'_>) -> Option<String> {
        let parent = node.parent()?;
        let (selected, qualifier) = match parent.kind() {
            "selector_expression" => ("field", "operand"),
            "qualified_type" => ("name", "package"),
            _ => return None,
        };
        if parent.child_by_field_name(selected) != Some(node) {
            return None;
        }
        self.field_text(parent, qualifier)
    }
}
