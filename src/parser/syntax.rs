//! Closed syntax model of one Go source file.
//!
//! The tree-sitter lowering in [`super::go`] produces these values and the
//! symbol extractor matches on them exhaustively. Type and value expressions
//! are kept as normalised source text.

use std::fmt;
use std::path::PathBuf;

/// A parsed Go source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Name from the `package` clause.
    pub package: String,
    /// Text of a `//go:build` line that precedes the package clause.
    pub build_constraint: Option<String>,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
    /// Every identifier occurrence, in source order.
    pub uses: Vec<IdentUse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit local name (`.` and `_` included).
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
}

/// Top-level declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Type(TypeSpec),
    Value(ValueSpec),
    Func(FuncDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub shape: TypeShape,
}

/// The declared shape of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Interface(Vec<InterfaceMember>),
    Struct(Vec<StructField>),
    /// A composite literal: literal type text plus element texts.
    ///
    /// A type declaration in valid Go never has this shape, so lowering
    /// never produces it; only a hand-built `TypeSpec` does.
    Composite {
        literal: String,
        elements: Vec<String>,
    },
    /// Any other underlying type, as text.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceMember {
    Method { name: String, signature: Signature },
    /// An embedded interface or type-set term, as text.
    Embedded(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// Field names; empty for an embedded field.
    pub names: Vec<String>,
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Func(Signature),
    /// Type text; a leading `*` is kept and stripped by the extractor.
    Expr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    pub names: Vec<String>,
    /// Initializer expression texts.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver type text for methods, e.g. `*Server` or `List[T]`.
    pub receiver: Option<String>,
    pub signature: Signature,
}

/// Parameter and result types of a function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

/// One parameter declaration: `a, b T` has two names and one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub names: usize,
    pub ty: String,
}

impl Param {
    pub fn new(names: usize, ty: impl Into<String>) -> Self {
        Self {
            names,
            ty: ty.into(),
        }
    }

    pub fn unnamed(ty: impl Into<String>) -> Self {
        Self::new(0, ty)
    }
}

/// An identifier occurrence with its selector qualifier, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentUse {
    pub qualifier: Option<String>,
    pub name: String,
}

impl IdentUse {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }
}

/// Expand each parameter declaration into one type per declared name.
fn types(params: &[Param]) -> Vec<&str> {
    params
        .iter()
        .flat_map(|param| std::iter::repeat(param.ty.as_str()).take(param.names.max(1)))
        .collect()
}

/// Renders `(P1, P2)`, then ` R` for one result or ` (R1, R2)` for several.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", types(&self.params).join(", "))?;
        let results = types(&self.results);
        match results.len() {
            0 => Ok(()),
            1 => write!(f, " {}", results[0]),
            _ => write!(f, " ({})", results.join(", ")),
        }
    }
}

/// Whether a name is exported: it starts with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
