//! Rust front end: loads a crate's sources into a [`Program`].
//!
//! Every module of the crate becomes a package named by its module path
//! (`crate`, `crate::models`, ...). Structs, enums and type aliases become
//! type declarations; `use` items that import whole modules become imports.
//! Serde attributes are folded into serialization tags so that renamed,
//! skipped and flattened fields look to the synthesizer like any other
//! tagged or embedded field.

mod index;
pub mod serde_attrs;
mod types;

pub use index::{ModuleIndex, Target, UseEntry};
pub use types::{Scope, TypeContext};

use crate::parser::{AstParser, ParsedFile};
use crate::program::{Field, Package, Program, SourceFile, StructType, TypeDecl, TypeExpr, Visibility};
use crate::scanner::FileScanner;
use crate::tag;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Component, Path};
use index::is_test_only;
use syn::ext::IdentExt;

/// Builds a [`Program`] from Rust sources.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Scan, parse and lower the crate rooted at `project`.
    ///
    /// Module paths are computed relative to `<project>/src` when it
    /// exists, otherwise relative to `project`. Files that do not parse are
    /// skipped with a warning.
    ///
    /// # Arguments
    ///
    /// * `project` - The crate directory, containing `src/` or the sources themselves
    ///
    /// # Returns
    ///
    /// A [`Program`] with one package per module, in module path order.
    ///
    /// # Errors
    ///
    /// Returns an error if `project` cannot be scanned.
    pub fn load(project: &Path) -> Result<Program> {
        let source_root = FileScanner::source_root(project);
        let scan = FileScanner::new(source_root.clone())
            .scan()
            .with_context(|| format!("Failed to scan {}", project.display()))?;
        for warning in &scan.warnings {
            warn!("{}", warning);
        }

        let parsed = AstParser::parse_files(&scan.rust_files);
        let program = Self::from_parsed(&source_root, &parsed);
        info!(
            "Loaded {} modules from {} files",
            program.packages.len(),
            parsed.len()
        );
        Ok(program)
    }

    /// Lower already parsed files.
    ///
    /// # Arguments
    ///
    /// * `source_root` - The directory module paths are computed from
    /// * `files` - Parsed files under `source_root`
    pub fn from_parsed(source_root: &Path, files: &[ParsedFile]) -> Program {
        let modules: Vec<String> = files
            .iter()
            .map(|file| module_path(source_root, &file.path))
            .collect();

        let mut index = ModuleIndex::new();
        for (file, module) in files.iter().zip(&modules) {
            index.add_file(module, &file.syntax_tree);
        }

        let mut packages: BTreeMap<String, Vec<SourceFile>> = BTreeMap::new();
        for (file, module) in files.iter().zip(&modules) {
            let mut lowered = Vec::new();
            lower_module(&index, &file.path, module, &file.syntax_tree.items, &mut lowered);
            for source in lowered {
                packages.entry(source.package.clone()).or_default().push(source);
            }
        }

        Program {
            packages: packages
                .into_iter()
                .map(|(path, files)| Package {
                    name: path.rsplit("::").next().unwrap_or(&path).to_string(),
                    path,
                    importable: true,
                    files,
                })
                .collect(),
        }
    }
}

/// Module path of a file relative to the source root.
///
/// `lib.rs` and `main.rs` at the top are the crate root; `a/mod.rs` is
/// `crate::a`; `a/b.rs` is `crate::a::b`.
pub fn module_path(source_root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(source_root).unwrap_or(file);
    let components: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let mut segments = vec!["crate".to_string()];
    if let Some((file_name, dirs)) = components.split_last() {
        segments.extend(dirs.iter().cloned());
        let stem = file_name.strip_suffix(".rs").unwrap_or(file_name);
        let is_crate_root = dirs.is_empty() && (stem == "lib" || stem == "main");
        if stem != "mod" && !is_crate_root {
            segments.push(stem.to_string());
        }
    }
    segments.join("::")
}

/// Lower the items of one module, then its inline child modules.
fn lower_module(
    index: &ModuleIndex,
    path: &Path,
    module: &str,
    items: &[syn::Item],
    out: &mut Vec<SourceFile>,
) {
    let scope = Scope::new(module, index);
    let mut decls = Vec::new();
    let mut children = Vec::new();

    for item in items {
        let decl = match item {
            syn::Item::Struct(item) => lower_struct(&scope, item),
            syn::Item::Enum(item) => lower_enum(item),
            syn::Item::Type(item) => {
                let cx = TypeContext::new(&scope, &item.generics, &item.ident);
                TypeDecl {
                    name: item.ident.unraw().to_string(),
                    doc: serde_attrs::doc_comment(&item.attrs),
                    ty: cx.lower(&item.ty),
                }
            }
            syn::Item::Mod(item) if item.content.is_some() && !is_test_only(&item.attrs) => {
                children.push(item);
                continue;
            }
            _ => continue,
        };

        if let TypeExpr::Unsupported(what) = &decl.ty {
            warn!("Leaving out {}::{}: {} is not supported", module, decl.name, what);
            continue;
        }
        debug!("Lowered {}::{}", module, decl.name);
        decls.push(decl);
    }

    out.push(SourceFile {
        path: path.to_path_buf(),
        package: module.to_string(),
        imports: scope.imports(),
        decls,
    });

    for child in children {
        if let Some((_, items)) = &child.content {
            let child_module = format!("{}::{}", module, child.ident);
            lower_module(index, path, &child_module, items, out);
        }
    }
}

fn lower_struct(scope: &Scope, item: &syn::ItemStruct) -> TypeDecl {
    let cx = TypeContext::new(scope, &item.generics, &item.ident);
    let ty = match &item.fields {
        syn::Fields::Named(named) => {
            let rule = serde_attrs::rename_all(&item.attrs);
            TypeExpr::Struct(StructType {
                fields: named
                    .named
                    .iter()
                    .map(|field| lower_field(&cx, field, rule.as_deref()))
                    .collect(),
            })
        }
        syn::Fields::Unit => TypeExpr::Struct(StructType::default()),
        syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            cx.lower(&unnamed.unnamed[0].ty)
        }
        syn::Fields::Unnamed(_) => TypeExpr::Unsupported(format!("tuple struct {}", item.ident)),
    };
    TypeDecl {
        name: item.ident.unraw().to_string(),
        doc: serde_attrs::doc_comment(&item.attrs),
        ty,
    }
}

/// Unit-only enums serialize as their variant names; anything else has no
/// single shape.
fn lower_enum(item: &syn::ItemEnum) -> TypeDecl {
    let unit_only = item
        .variants
        .iter()
        .all(|variant| matches!(variant.fields, syn::Fields::Unit));
    TypeDecl {
        name: item.ident.unraw().to_string(),
        doc: serde_attrs::doc_comment(&item.attrs),
        ty: if unit_only {
            TypeExpr::ident("String")
        } else {
            TypeExpr::Interface
        },
    }
}

fn lower_field(cx: &TypeContext, field: &syn::Field, rename_all: Option<&str>) -> Field {
    let attrs = serde_attrs::field_attrs(&field.attrs);
    let ident = field
        .ident
        .as_ref()
        .map(|ident| ident.unraw().to_string())
        .unwrap_or_default();
    let ty = cx.lower(&field.ty);
    let visibility = match &field.vis {
        syn::Visibility::Public(_) => Visibility::Public,
        syn::Visibility::Restricted(_) => Visibility::Restricted,
        syn::Visibility::Inherited => Visibility::Private,
    };
    let mut lowered = Field {
        name: Some(ident.clone()),
        ty,
        tag: None,
        doc: serde_attrs::doc_comment(&field.attrs),
        visibility,
        skipped: attrs.skip,
    };

    if attrs.flatten {
        if matches!(lowered.ty.deref(), TypeExpr::Ident(_) | TypeExpr::Selector { .. }) {
            lowered.name = None;
            return lowered;
        }
        warn!("Flattened field {} is not a named type; leaving it out", ident);
        lowered.skipped = true;
        return lowered;
    }

    let serialized = attrs
        .rename
        .or_else(|| rename_all.map(|rule| serde_attrs::rename_field(&ident, rule)))
        .unwrap_or_else(|| ident.clone());
    if serialized.contains(['`', '"']) {
        warn!("Cannot express serialized name {:?} of field {}", serialized, ident);
        return lowered;
    }
    let flags: &[&str] = if attrs.omit_empty { &["omitempty"] } else { &[] };
    if serialized != ident || !flags.is_empty() {
        lowered.tag = Some(tag::render(&serialized, flags));
    }
    lowered
}
