//! Schema synthesis over a loaded [`Program`].
//!
//! A [`Scanner`] walks every type declaration of the program, turns each into
//! a [`Schema`] stored under its external name, and follows references to
//! declarations elsewhere through a [`Worklist`] until no undiscovered
//! declaration remains.

use crate::annotation::{self, Annotation};
use crate::binding::SourceBinding;
use crate::declaration::{DeclIdentity, SchemaDecl};
use crate::directive::DirectiveTable;
use crate::error::{Error, Result};
use crate::program::{Field, Program, SourceFile, StructType, TypeDecl, TypeExpr};
use crate::resolver::{Located, Resolver};
use crate::schema::{Definitions, PropertyTarget, Schema};
use crate::tag;
use crate::worklist::Worklist;
use log::{debug, info};
use std::collections::HashSet;

/// Options controlling which declarations are collected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Only collect declarations carrying a `swagger:model` line.
    /// Declarations reached through references are synthesized regardless.
    pub annotated_only: bool,
}

/// Per-run synthesis context.
///
/// Owns the definitions produced so far, the queue of referenced
/// declarations and the set of declarations already synthesized. Borrows
/// the program for the whole run.
pub struct Scanner<'p> {
    pub(crate) resolver: Resolver<'p>,
    pub(crate) binding: &'p dyn SourceBinding,
    options: ScanOptions,
    definitions: Definitions,
    pub(crate) worklist: Worklist<'p>,
    synthesized: HashSet<DeclIdentity>,
    /// Non-struct declarations being mapped on the current path
    pub(crate) expanding: HashSet<DeclIdentity>,
    /// Structs being flattened on the current embedding chain
    embedding: HashSet<DeclIdentity>,
}

impl<'p> Scanner<'p> {
    pub fn new(program: &'p Program, binding: &'p dyn SourceBinding) -> Self {
        debug!("Initializing Scanner for {} packages", program.packages.len());
        Self {
            resolver: Resolver::new(program),
            binding,
            options: ScanOptions::default(),
            definitions: Definitions::new(),
            worklist: Worklist::new(),
            synthesized: HashSet::new(),
            expanding: HashSet::new(),
            embedding: HashSet::new(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Definitions synthesized so far.
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Number of declarations waiting in the worklist.
    pub fn pending(&self) -> usize {
        self.worklist.len()
    }

    /// Consume the scanner, returning its definitions.
    pub fn finish(self) -> Definitions {
        self.definitions
    }

    /// Scan every file of every package in order, then drain the worklist.
    ///
    /// # Returns
    ///
    /// The definitions keyed by external name, one per collected or
    /// referenced declaration.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while synthesizing any declaration,
    /// such as a malformed tag, an unresolved embedded type or a cyclic
    /// embedding. Nothing is returned from a failed run.
    pub fn run(mut self) -> Result<Definitions> {
        let program = self.resolver.program();
        for file in program.files() {
            self.scan_file(file)?;
        }
        self.drain_worklist()?;
        info!("Synthesized {} definitions", self.definitions.len());
        Ok(self.finish())
    }

    /// Collect and synthesize the type declarations of one file.
    pub fn scan_file(&mut self, file: &'p SourceFile) -> Result<()> {
        debug!("Scanning declarations in {}", file.path.display());
        for decl in &file.decls {
            let decl = SchemaDecl::new(file, decl);
            if self.options.annotated_only && !decl.is_model() {
                debug!("Skipping {}: not marked as a model", decl.ident_name());
                continue;
            }
            self.synthesize(&decl)?;
        }
        Ok(())
    }

    /// Synthesize every queued declaration, including ones queued meanwhile.
    pub fn drain_worklist(&mut self) -> Result<()> {
        if self.worklist.is_empty() {
            debug!("No referenced declarations queued");
            return Ok(());
        }
        while let Some(decl) = self.worklist.pop() {
            if self.synthesized.contains(&decl.identity()) {
                debug!("{} already synthesized", decl.name());
                continue;
            }
            self.synthesize(&decl)?;
        }
        Ok(())
    }

    /// Build or update the schema of one declaration.
    ///
    /// The schema stored under the declaration's external name is taken out
    /// of the definitions, updated and put back. On error it is not put back.
    pub fn synthesize(&mut self, decl: &SchemaDecl<'p>) -> Result<()> {
        let (ident, name) = decl.infer_names();
        debug!("Synthesizing {} as {}", ident, name);

        let mut schema = self.definitions.remove(name).unwrap_or_default();
        let annotation = Annotation::parse(decl.doc());
        let declared: &'p TypeDecl = decl.decl;

        match &declared.ty {
            TypeExpr::Struct(st) => {
                // Properties and required names survive for pruning, nothing else does
                schema = Schema {
                    properties: std::mem::take(&mut schema.properties),
                    required: std::mem::take(&mut schema.required),
                    extensions: std::mem::take(&mut schema.extensions),
                    ..Schema::default()
                };
                schema.title = annotation.title();
                schema.description = annotation.description();
                let identity = decl.identity();
                self.embedding.insert(identity.clone());
                let applied = self.apply_struct(decl.file, &mut schema, st);
                self.embedding.remove(&identity);
                applied?;
            }
            other => {
                schema = Schema {
                    extensions: std::mem::take(&mut schema.extensions),
                    ..Schema::default()
                };
                match annotation::strfmt_name(decl.doc()) {
                    Some(format) => schema.typed("string", &format),
                    None => {
                        let identity = decl.identity();
                        self.expanding.insert(identity.clone());
                        let mapped =
                            self.map_type(decl.file, other, &mut PropertyTarget::new(&mut schema));
                        self.expanding.remove(&identity);
                        mapped?;
                    }
                }
                if !schema.is_ref() {
                    schema.title = annotation.title();
                    schema.description = annotation.description();
                }
            }
        }

        if name != ident {
            schema.add_extension(self.binding.name_extension(), ident);
        } else {
            schema.extensions.remove(self.binding.name_extension());
        }
        match self.resolver.package_for_file(decl.file) {
            Ok(package) if package.importable => {
                schema.add_extension(self.binding.package_extension(), package.path.as_str());
            }
            Ok(_) => {
                schema.extensions.remove(self.binding.package_extension());
            }
            Err(e) => {
                debug!("No package extension for {}: {}", name, e);
                schema.extensions.remove(self.binding.package_extension());
            }
        }

        self.definitions.insert(name.to_string(), schema);
        self.synthesized.insert(decl.identity());
        Ok(())
    }

    /// Fill `schema` from a struct type and prune properties it no longer has.
    pub(crate) fn apply_struct(
        &mut self,
        file: &'p SourceFile,
        schema: &mut Schema,
        st: &'p StructType,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        schema.all_of.clear();
        self.flatten_struct(file, schema, st, &mut seen)?;

        schema.properties.retain(|name, _| seen.contains(name));
        schema.required.retain(|name| seen.contains(name));
        Ok(())
    }

    /// Embedded fields first, in order, then the struct's own fields.
    fn flatten_struct(
        &mut self,
        file: &'p SourceFile,
        schema: &mut Schema,
        st: &'p StructType,
        seen: &mut HashSet<String>,
    ) -> Result<()> {
        schema.typed("object", "");

        for field in st.fields.iter().filter(|f| f.is_embedded() && !f.skipped) {
            self.flatten_embedded(file, schema, field, seen)?;
        }

        for field in &st.fields {
            let Some(ident) = field.name.as_deref() else {
                continue;
            };
            if !self.binding.is_exported(field) {
                debug!("Field {} is not exported", ident);
                continue;
            }
            self.apply_field(file, schema, field, ident, seen)?;
        }
        Ok(())
    }

    fn flatten_embedded(
        &mut self,
        file: &'p SourceFile,
        schema: &mut Schema,
        field: &'p Field,
        seen: &mut HashSet<String>,
    ) -> Result<()> {
        let located = self.resolve_embedded(file, &field.ty)?;

        if annotation::is_all_of_member(field.doc.as_deref()) {
            let member = SchemaDecl::new(located.file, located.decl);
            let reference = Schema::reference_to(member.name())?;
            debug!("{} is an allOf member", member.name());
            if !schema.all_of.contains(&reference) {
                schema.all_of.push(reference);
            }
            self.worklist.push(member);
            return Ok(());
        }

        match &located.decl.ty {
            TypeExpr::Struct(st) => {
                let identity = SchemaDecl::new(located.file, located.decl).identity();
                if !self.embedding.insert(identity.clone()) {
                    return Err(Error::UnsupportedConstruct(format!(
                        "cyclic embedding of {}",
                        located.decl.name
                    )));
                }
                debug!("Flattening embedded {}", located.decl.name);
                let flattened = self.flatten_struct(located.file, schema, st, seen);
                self.embedding.remove(&identity);
                flattened
            }
            _ => Err(Error::UnsupportedConstruct(format!(
                "embedded non-struct type {}",
                located.decl.name
            ))),
        }
    }

    fn resolve_embedded(&self, file: &'p SourceFile, ty: &TypeExpr) -> Result<Located<'p>> {
        match ty.deref() {
            TypeExpr::Ident(name) => self.resolver.find_in_file_package(file, name),
            TypeExpr::Selector { qualifier, name } => {
                let package = self.resolver.package_for_selector(file, qualifier, self.binding)?;
                self.resolver.find_declaration(package, name)
            }
            other => Err(Error::UnsupportedConstruct(format!(
                "embedded field of type {:?}",
                other
            ))),
        }
    }

    /// Map one own field into a fresh property of `schema`.
    fn apply_field(
        &mut self,
        file: &'p SourceFile,
        schema: &mut Schema,
        field: &'p Field,
        ident: &str,
        seen: &mut HashSet<String>,
    ) -> Result<()> {
        if matches!(field.ty.deref(), TypeExpr::Interface) {
            debug!("Skipping interface-typed field {}", ident);
            return Ok(());
        }
        let name = tag::property_name(ident, field.tag.as_deref())?
            .unwrap_or_else(|| ident.to_string());

        let mut property = Schema::default();
        self.map_type(file, &field.ty, &mut PropertyTarget::new(&mut property))?;

        let annotation = Annotation::parse(field.doc.as_deref());
        if property.is_ref() {
            DirectiveTable::for_reference().apply(&annotation.directives, schema, &name, &mut property);
        } else {
            property.description = annotation.text();
            let with_items = matches!(field.ty.deref(), TypeExpr::Array(_))
                && property.items.as_deref().is_some_and(|items| !items.is_ref());
            DirectiveTable::for_property(with_items).apply(
                &annotation.directives,
                schema,
                &name,
                &mut property,
            );
        }

        if name != ident {
            property.add_extension(self.binding.name_extension(), ident);
        }
        seen.insert(name.clone());
        schema.properties.insert(name, property);
        Ok(())
    }
}
