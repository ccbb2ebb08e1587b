//! Mapping of field type expressions to schema shapes.

use crate::annotation;
use crate::declaration::SchemaDecl;
use crate::error::{Error, Result};
use crate::program::{SourceFile, TypeExpr};
use crate::resolver::Located;
use crate::schema::{definition_ref, PropertyTarget, Schema};
use crate::synthesizer::Scanner;
use log::{debug, warn};

impl<'p> Scanner<'p> {
    /// Map a type expression written in `file` into `target`.
    ///
    /// Named types are resolved against the declarations of the program
    /// first and fall back to the binding's primitive table. A name found in
    /// neither is left untyped. Struct types become references to their
    /// definition, and their declaration is queued for synthesis.
    ///
    /// # Arguments
    ///
    /// * `file` - The file the expression is written in, used for name lookup
    /// * `expr` - The type expression to map
    /// * `target` - The schema being written, with access to its `items`
    ///
    /// # Returns
    ///
    /// `Ok(())` once `target` holds the shape of `expr`.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported type shapes, selectors without a
    /// matching import, and failures while synthesizing inline structs.
    pub fn map_type(
        &mut self,
        file: &'p SourceFile,
        expr: &'p TypeExpr,
        target: &mut PropertyTarget<'_>,
    ) -> Result<()> {
        match expr {
            TypeExpr::Ident(name) => match self.resolver.find_in_file_package(file, name) {
                Ok(located) => self.map_declared(located, target),
                Err(e) if e.is_not_found() => {
                    self.map_primitive(file, name, target);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            TypeExpr::Selector { qualifier, name } => {
                let package = self.resolver.package_for_selector(file, qualifier, self.binding)?;
                match self.resolver.find_declaration(package, name) {
                    Ok(located) => self.map_declared(located, target),
                    Err(e) if e.is_not_found() => {
                        debug!("{}::{} is not declared, trying primitives", qualifier, name);
                        self.map_primitive(file, name, target);
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            TypeExpr::Pointer(inner) => self.map_type(file, inner, target),
            TypeExpr::Array(inner) => self.map_type(file, inner, &mut target.items()),
            TypeExpr::Map { key, value } => {
                if !self.binding.is_string_key(key) {
                    debug!("Map key {:?} is not a string, emitting a plain object", key);
                    target.typed("object", "");
                    return Ok(());
                }
                let mut additional = Schema::default();
                self.map_type(file, value, &mut PropertyTarget::new(&mut additional))?;
                target.typed("object", "");
                target.schema().additional_properties = Some(Box::new(additional));
                Ok(())
            }
            TypeExpr::Struct(st) => self.apply_struct(file, target.schema(), st),
            TypeExpr::Interface => {
                debug!("Skipping interface type");
                Ok(())
            }
            TypeExpr::Unsupported(what) => Err(Error::UnsupportedConstruct(what.clone())),
        }
    }

    /// Map a resolved declaration.
    fn map_declared(&mut self, located: Located<'p>, target: &mut PropertyTarget<'_>) -> Result<()> {
        let decl = located.decl;
        if let Some(format) = annotation::strfmt_name(decl.doc.as_deref()) {
            target.typed("string", &format);
            return Ok(());
        }

        if let TypeExpr::Struct(_) = decl.ty {
            return self.reference(located, target);
        }

        let member = SchemaDecl::new(located.file, decl);
        let identity = member.identity();
        if !self.expanding.insert(identity.clone()) {
            debug!("{} refers to itself, emitting a reference", decl.name);
            return self.reference(located, target);
        }
        let mapped = self.map_type(located.file, &decl.ty, target);
        self.expanding.remove(&identity);
        mapped
    }

    /// Point `target` at the definition of a declaration and queue it.
    fn reference(&mut self, located: Located<'p>, target: &mut PropertyTarget<'_>) -> Result<()> {
        let member = SchemaDecl::new(located.file, located.decl);
        target.set_ref(definition_ref(member.name())?);
        self.worklist.push(member);
        Ok(())
    }

    /// Best effort: unknown names leave `target` untyped.
    fn map_primitive(&self, file: &SourceFile, name: &str, target: &mut PropertyTarget<'_>) {
        match self.binding.primitive(name) {
            Some((schema_type, format)) => target.typed(schema_type, format),
            None => warn!(
                "{} is neither declared in {} nor a known primitive, leaving it untyped",
                name, file.package
            ),
        }
    }
}
