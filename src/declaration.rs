//! Type declarations queued for schema synthesis.

use crate::annotation;
use crate::program::{SourceFile, TypeDecl};
use std::cell::OnceCell;
use std::path::PathBuf;

/// A type declaration together with the file declaring it and its names.
///
/// The internal name is the declared identifier. The external name, under
/// which the schema is stored, defaults to the identifier and is overridden
/// by a `swagger:model <name>` line in the doc comment. Both are computed on
/// first use and cached.
#[derive(Debug, Clone)]
pub struct SchemaDecl<'p> {
    pub file: &'p SourceFile,
    pub decl: &'p TypeDecl,
    names: OnceCell<(String, String)>,
}

/// Identifies a declaration independently of its names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclIdentity {
    pub package: String,
    pub file: PathBuf,
    pub ident: String,
}

impl<'p> SchemaDecl<'p> {
    pub fn new(file: &'p SourceFile, decl: &'p TypeDecl) -> Self {
        Self {
            file,
            decl,
            names: OnceCell::new(),
        }
    }

    /// `(internal, external)` names, computed at most once.
    pub fn infer_names(&self) -> (&str, &str) {
        let (ident, name) = self.names.get_or_init(|| {
            let ident = self.decl.name.clone();
            let name = annotation::model_name(self.doc()).unwrap_or_else(|| ident.clone());
            (ident, name)
        });
        (ident, name)
    }

    pub fn ident_name(&self) -> &str {
        self.infer_names().0
    }

    pub fn name(&self) -> &str {
        self.infer_names().1
    }

    pub fn doc(&self) -> Option<&'p str> {
        self.decl.doc.as_deref()
    }

    /// Whether the declaration is explicitly marked as a model.
    pub fn is_model(&self) -> bool {
        annotation::is_model(self.doc())
    }

    pub fn identity(&self) -> DeclIdentity {
        DeclIdentity {
            package: self.file.package.clone(),
            file: self.file.path.clone(),
            ident: self.decl.name.clone(),
        }
    }
}
