//! The program representation consumed by the schema scanner.
//!
//! A [`Program`] is a read-only index of packages, their source files, each
//! file's import table and its type declarations with documentation text
//! already attached. It is produced by a front end (see [`crate::loader`] for
//! Rust sources) or deserialized from a JSON/YAML program document, and is
//! never mutated while schemas are synthesized.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A whole program: every loaded package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub packages: Vec<Package>,
}

/// A package (module) and the files that make it up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Full package path, e.g. `crate::models`
    pub path: String,
    /// Short package name, e.g. `models`
    pub name: String,
    /// Whether the package path is recorded on the schemas it declares
    #[serde(default = "default_true")]
    pub importable: bool,
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

/// One source file with its imports and type declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path of the package this file belongs to
    pub package: String,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub decls: Vec<TypeDecl>,
}

/// An import table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Explicit alias; when absent the name is inferred from the path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub path: String,
}

/// A top-level type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub ty: TypeExpr,
}

/// The closed set of type expression shapes the mapper understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    /// A bare type name, resolved in the current package
    Ident(String),
    /// An optional/indirect value
    Pointer(Box<TypeExpr>),
    /// A sequence of elements
    Array(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// An inline struct body
    Struct(StructType),
    /// A name qualified by an import alias or package path
    Selector { qualifier: String, name: String },
    /// An open/polymorphic type; produces no schema
    Interface,
    /// Anything else, with a short description for error messages
    Unsupported(String),
}

/// The body of a struct declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructType {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Source-level visibility of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Restricted,
    #[default]
    Private,
}

/// A struct field. Fields without a name are embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ty: TypeExpr,
    /// Raw, quoted serialization tag literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    /// Excluded from serialization by the source program
    #[serde(default)]
    pub skipped: bool,
}

fn default_true() -> bool {
    true
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TypeExpr::Ident(name.into())
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn array(inner: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(inner))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn selector(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Selector {
            qualifier: qualifier.into(),
            name: name.into(),
        }
    }

    /// Strip any number of pointer layers.
    pub fn deref(&self) -> &TypeExpr {
        let mut current = self;
        while let TypeExpr::Pointer(inner) = current {
            current = inner;
        }
        current
    }
}

impl Field {
    /// A named field with no tag, doc or visibility modifiers.
    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            tag: None,
            doc: None,
            visibility: Visibility::Public,
            skipped: false,
        }
    }

    /// An embedded (anonymous) field.
    pub fn embedded(ty: TypeExpr) -> Self {
        Self {
            name: None,
            ..Self::named("", ty)
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }
}

impl Program {
    /// Read a program document in JSON.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a program document in YAML.
    ///
    /// Enum-valued nodes are written as single-key maps, the same shape as
    /// the JSON document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_yaml::from_str(content)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Look up a package by its full path.
    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.path == path)
    }

    /// Look up the source file at the given path.
    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files().find(|f| f.path == path)
    }

    /// All files of all packages, in package then file order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.packages.iter().flat_map(|p| p.files.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deref_strips_all_pointers() {
        let ty = TypeExpr::pointer(TypeExpr::pointer(TypeExpr::ident("u32")));
        assert_eq!(ty.deref(), &TypeExpr::ident("u32"));
    }

    #[test]
    fn test_program_from_json() {
        let json = r#"{
            "packages": [{
                "path": "crate::models",
                "name": "models",
                "files": [{
                    "path": "src/models.rs",
                    "package": "crate::models",
                    "imports": [{"path": "crate::shared"}],
                    "decls": [{
                        "name": "Pet",
                        "doc": "swagger:model pet",
                        "ty": {"struct": {"fields": [
                            {"name": "Name", "ty": {"ident": "String"}, "tag": "`json:\"name\"`"},
                            {"ty": {"selector": {"qualifier": "shared", "name": "Base"}}}
                        ]}}
                    }]
                }]
            }]
        }"#;

        let program = Program::from_json_str(json).unwrap();
        let package = program.package("crate::models").unwrap();
        assert!(package.importable);
        let file = &package.files[0];
        assert_eq!(file.imports[0].alias, None);

        let TypeExpr::Struct(st) = &file.decls[0].ty else {
            panic!("Expected struct declaration");
        };
        assert_eq!(st.fields.len(), 2);
        assert_eq!(st.fields[0].visibility, Visibility::Private);
        assert!(st.fields[1].is_embedded());
        assert_eq!(
            st.fields[1].ty,
            TypeExpr::selector("shared", "Base")
        );
    }

    #[test]
    fn test_program_from_yaml() {
        let yaml = r#"
packages:
  - path: crate
    name: crate
    importable: false
    files:
      - path: src/lib.rs
        package: crate
        decls:
          - name: Ids
            ty:
              array:
                ident: u64
"#;
        let program = Program::from_yaml_str(yaml).unwrap();
        assert!(!program.packages[0].importable);
        let file = program.file(Path::new("src/lib.rs")).unwrap();
        assert_eq!(file.decls[0].ty, TypeExpr::array(TypeExpr::ident("u64")));
    }

    #[test]
    fn test_program_from_invalid_json() {
        assert!(Program::from_json_str("{ not json").is_err());
    }
}
