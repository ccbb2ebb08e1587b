//! Cross-package symbol lookup over a [`Program`].

use crate::annotation;
use crate::binding::SourceBinding;
use crate::error::{Error, Result};
use crate::program::{Package, Program, SourceFile, TypeDecl};
use log::debug;

/// Resolves packages and type declarations within a program.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'p> {
    program: &'p Program,
}

/// A declaration located in its package and file.
#[derive(Debug, Clone, Copy)]
pub struct Located<'p> {
    pub package: &'p Package,
    pub file: &'p SourceFile,
    pub decl: &'p TypeDecl,
}

impl<'p> Resolver<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// The package a file belongs to.
    pub fn package_for_file(&self, file: &SourceFile) -> Result<&'p Package> {
        self.program
            .package(&file.package)
            .ok_or_else(|| Error::UnresolvedPackage {
                file: file.path.clone(),
            })
    }

    /// The package a selector qualifier refers to from within `file`.
    ///
    /// The qualifier is matched against the file's imports, by explicit alias
    /// or by the name the binding infers from the import path. A qualifier
    /// that is itself a loaded package path resolves to that package.
    pub fn package_for_selector(
        &self,
        file: &SourceFile,
        qualifier: &str,
        binding: &dyn SourceBinding,
    ) -> Result<&'p Package> {
        let import = file.imports.iter().find(|import| match &import.alias {
            Some(alias) => alias == qualifier,
            None => binding.import_name(&import.path) == qualifier,
        });

        let path = match import {
            Some(import) => import.path.as_str(),
            None => {
                if let Some(package) = self.program.package(qualifier) {
                    debug!("Qualifier {} is a package path", qualifier);
                    return Ok(package);
                }
                return Err(Error::UnresolvedImport {
                    qualifier: qualifier.to_string(),
                    file: file.path.clone(),
                });
            }
        };

        self.program
            .package(path)
            .ok_or_else(|| Error::UnresolvedImport {
                qualifier: qualifier.to_string(),
                file: file.path.clone(),
            })
    }

    /// Find the declaration named `name` in `package`.
    ///
    /// A declaration matches by identifier, or by the format name of its
    /// string-format marker.
    pub fn find_declaration(&self, package: &'p Package, name: &str) -> Result<Located<'p>> {
        for file in &package.files {
            for decl in &file.decls {
                let strfmt = annotation::strfmt_name(decl.doc.as_deref());
                if decl.name == name || strfmt.as_deref() == Some(name) {
                    debug!("Found {} in {}", name, file.path.display());
                    return Ok(Located {
                        package,
                        file,
                        decl,
                    });
                }
            }
        }
        Err(Error::UnresolvedType {
            name: name.to_string(),
            package: package.path.clone(),
        })
    }

    /// Resolve `name` in the package of `file`.
    pub fn find_in_file_package(&self, file: &SourceFile, name: &str) -> Result<Located<'p>> {
        let package = self.package_for_file(file)?;
        self.find_declaration(package, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::RustBinding;
    use crate::program::{Import, StructType, TypeExpr};
    use std::path::PathBuf;

    fn decl(name: &str, doc: Option<&str>) -> TypeDecl {
        TypeDecl {
            name: name.to_string(),
            doc: doc.map(str::to_string),
            ty: TypeExpr::Struct(StructType::default()),
        }
    }

    fn file(path: &str, package: &str, imports: Vec<Import>, decls: Vec<TypeDecl>) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            package: package.to_string(),
            imports,
            decls,
        }
    }

    fn package(path: &str, files: Vec<SourceFile>) -> Package {
        Package {
            path: path.to_string(),
            name: path.rsplit("::").next().unwrap().to_string(),
            importable: true,
            files,
        }
    }

    fn program() -> Program {
        Program {
            packages: vec![
                package(
                    "crate",
                    vec![file(
                        "src/lib.rs",
                        "crate",
                        vec![
                            Import {
                                alias: None,
                                path: "crate::models".to_string(),
                            },
                            Import {
                                alias: Some("m".to_string()),
                                path: "crate::models".to_string(),
                            },
                            Import {
                                alias: None,
                                path: "crate::missing".to_string(),
                            },
                        ],
                        vec![decl("Order", None)],
                    )],
                ),
                package(
                    "crate::models",
                    vec![
                        file("src/models/a.rs", "crate::models", vec![], vec![decl("Pet", None)]),
                        file(
                            "src/models/b.rs",
                            "crate::models",
                            vec![],
                            vec![decl("EmailAddress", Some("swagger:strfmt email"))],
                        ),
                    ],
                ),
            ],
        }
    }

    #[test]
    fn test_package_for_file() {
        let program = program();
        let resolver = Resolver::new(&program);
        let lib = &program.packages[0].files[0];
        assert_eq!(resolver.package_for_file(lib).unwrap().path, "crate");

        let orphan = file("src/orphan.rs", "crate::orphan", vec![], vec![]);
        assert!(matches!(
            resolver.package_for_file(&orphan),
            Err(Error::UnresolvedPackage { .. })
        ));
    }

    #[test]
    fn test_package_for_selector() {
        let program = program();
        let resolver = Resolver::new(&program);
        let binding = RustBinding::new();
        let lib = &program.packages[0].files[0];

        let by_name = resolver.package_for_selector(lib, "models", &binding).unwrap();
        assert_eq!(by_name.path, "crate::models");
        let by_alias = resolver.package_for_selector(lib, "m", &binding).unwrap();
        assert_eq!(by_alias.path, "crate::models");
        let by_path = resolver
            .package_for_selector(lib, "crate::models", &binding)
            .unwrap();
        assert_eq!(by_path.path, "crate::models");

        assert!(matches!(
            resolver.package_for_selector(lib, "nope", &binding),
            Err(Error::UnresolvedImport { .. })
        ));
        assert!(matches!(
            resolver.package_for_selector(lib, "missing", &binding),
            Err(Error::UnresolvedImport { .. })
        ));
    }

    #[test]
    fn test_find_declaration_across_files() {
        let program = program();
        let resolver = Resolver::new(&program);
        let models = &program.packages[1];

        let found = resolver.find_declaration(models, "Pet").unwrap();
        assert_eq!(found.file.path, PathBuf::from("src/models/a.rs"));

        let found = resolver.find_declaration(models, "email").unwrap();
        assert_eq!(found.decl.name, "EmailAddress");

        let err = resolver.find_declaration(models, "Order").unwrap_err();
        assert!(err.is_not_found());
    }
}
