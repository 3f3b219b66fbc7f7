//! Symbol extraction: populates the symbol trees from parsed packages.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::SymbolTables;
use crate::locate::{has_skipped_element, package_name, Roots, CGO_PACKAGE};
use crate::parser::syntax::{
    is_exported, Decl, FieldType, FuncDecl, InterfaceMember, SourceFile, StructField, TypeShape,
    TypeSpec, ValueSpec,
};
use crate::parser::ParsedPackage;

/// Walks parsed packages and records their exported symbols, imports and
/// references into a [`SymbolTables`].
pub struct Extractor<'a> {
    tables: &'a mut SymbolTables,
    roots: &'a Roots,
    skip_dirs: &'a [String],
    processed: HashSet<PathBuf>,
}

impl<'a> Extractor<'a> {
    pub fn new(tables: &'a mut SymbolTables, roots: &'a Roots, skip_dirs: &'a [String]) -> Self {
        Self {
            tables,
            roots,
            skip_dirs,
            processed: HashSet::new(),
        }
    }

    /// Extract the packages found at `location`. A location is processed at
    /// most once; later calls return `false` and change nothing.
    pub fn extract_dir(&mut self, location: &Path, packages: &[ParsedPackage]) -> bool {
        if !self.processed.insert(location.to_path_buf()) {
            debug!(dir = %location.display(), "already extracted");
            return false;
        }
        let dir = location.to_string_lossy();
        for package in packages {
            for file in &package.files {
                self.extract_file(&dir, &package.name, file);
            }
        }
        true
    }

    /// Extract one file of `package` located in `dir`.
    pub fn extract_file(&mut self, dir: &str, package: &str, file: &SourceFile) {
        let aliases = self.imports(file);
        let mut scope = FileScope {
            tables: &mut *self.tables,
            dir,
            package,
        };

        for decl in &file.decls {
            match decl {
                Decl::Type(spec) => scope.type_spec(spec),
                Decl::Value(spec) => scope.value_spec(spec),
                Decl::Func(func) => scope.func_decl(func),
            }
        }

        for ident in &file.uses {
            if !is_exported(&ident.name) {
                continue;
            }
            let qualifier = ident.qualifier.as_deref().unwrap_or(package);
            if let Some(imported) = aliases.get(qualifier) {
                scope
                    .tables
                    .references
                    .insert([format!("{imported}.{}", ident.name), dir.to_string()]);
            }
        }
    }

    /// Record the file's imports and return its alias → package table.
    fn imports(&mut self, file: &SourceFile) -> HashMap<String, String> {
        let mut aliases = HashMap::new();
        for import in &file.imports {
            if import.path == CGO_PACKAGE || has_skipped_element(&import.path, self.skip_dirs) {
                continue;
            }
            let package = package_name(&import.path);
            let dir = self.roots.locate(&import.path);
            let alias = import.alias.clone().unwrap_or_else(|| package.clone());
            self.tables
                .imports
                .insert([package.clone(), dir.to_string_lossy().into_owned()]);
            aliases.insert(alias, package);
        }
        aliases
    }
}

/// Per-file view used while recording declarations.
struct FileScope<'t, 'f> {
    tables: &'t mut SymbolTables,
    dir: &'f str,
    package: &'f str,
}

impl FileScope<'_, '_> {
    fn qualify(&self, name: &str) -> String {
        format!("{}.{}", self.package, name)
    }

    fn define(&mut self, name: &str) {
        let key = self.qualify(name);
        self.tables.definitions.insert([key, self.dir.to_string()]);
    }

    fn type_spec(&mut self, spec: &TypeSpec) {
        if !is_exported(&spec.name) {
            return;
        }
        self.define(&spec.name);
        let key = self.qualify(&spec.name);

        match &spec.shape {
            TypeShape::Interface(members) => {
                for member in members {
                    let entry = match member {
                        InterfaceMember::Method { name, signature } => format!("{name}{signature}"),
                        InterfaceMember::Embedded(text) => {
                            if !text.contains('.') && is_exported(text) {
                                self.qualify(text)
                            } else {
                                text.clone()
                            }
                        }
                    };
                    self.tables.interfaces.insert([key.clone(), entry]);
                }
            }
            TypeShape::Struct(fields) => {
                for field in fields {
                    let line = descriptor(field);
                    if is_exported(&line) {
                        self.tables.types.insert([key.clone(), line]);
                    }
                }
            }
            TypeShape::Composite { literal, elements } => {
                self.tables.types.insert([key.clone(), literal.clone()]);
                for element in elements {
                    self.tables
                        .types
                        .insert([key.clone(), literal.clone(), element.clone()]);
                }
            }
            TypeShape::Other(text) => {
                self.tables.types.insert([key, text.clone()]);
            }
        }
    }

    fn value_spec(&mut self, spec: &ValueSpec) {
        for name in spec.names.iter().filter(|name| is_exported(name)) {
            self.define(name);
            let key = self.qualify(name);
            for value in &spec.values {
                self.tables.values.insert([key.clone(), value.clone()]);
            }
        }
    }

    fn func_decl(&mut self, func: &FuncDecl) {
        if !is_exported(&func.name) {
            return;
        }
        self.define(&func.name);
        let member = format!("{}{}", func.name, func.signature);

        match &func.receiver {
            None => {
                let key = self.qualify(&func.name);
                self.tables.functions.insert([key, member]);
            }
            Some(receiver) => {
                let base = receiver_base(receiver);
                if is_exported(base) {
                    let key = self.qualify(base);
                    self.tables.types.insert([key, member]);
                }
            }
        }
    }
}

/// Descriptor line of a struct field: comma-joined names, then the
/// signature of a function-typed field or the field type without a leading
/// pointer marker.
fn descriptor(field: &StructField) -> String {
    let names = field.names.join(", ");
    match &field.ty {
        FieldType::Func(signature) => format!("{names}{signature}"),
        FieldType::Expr(ty) => {
            let ty = ty.strip_prefix('*').unwrap_or(ty);
            if names.is_empty() {
                ty.to_string()
            } else {
                format!("{names} {ty}")
            }
        }
    }
}

/// Receiver type name without pointer marker or type arguments.
fn receiver_base(receiver: &str) -> &str {
    let base = receiver.trim().strip_prefix('*').unwrap_or(receiver.trim());
    base.split('[').next().unwrap_or(base).trim()
}
