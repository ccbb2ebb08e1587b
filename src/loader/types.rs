//! Lowering of `syn` types to [`TypeExpr`].

use super::index::{ModuleIndex, Target, UseEntry};
use crate::program::{Import, TypeExpr};
use std::collections::{HashMap, HashSet};
use syn::ext::IdentExt;

/// Name resolution inside one module.
pub struct Scope<'a> {
    module: String,
    index: &'a ModuleIndex,
    /// Local names of `use` items that import a whole loaded module
    module_imports: HashMap<String, String>,
}

impl<'a> Scope<'a> {
    pub fn new(module: &str, index: &'a ModuleIndex) -> Self {
        let module_imports = index
            .uses(module)
            .iter()
            .filter_map(|entry| match entry {
                UseEntry::Name { local, path } => {
                    let target = index.absolutize_use(module, path).join("::");
                    index
                        .contains_module(&target)
                        .then(|| (local.clone(), target))
                }
                UseEntry::Glob { .. } => None,
            })
            .collect();
        Self {
            module: module.to_string(),
            index,
            module_imports,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Imports of whole modules, in a stable order.
    pub fn imports(&self) -> Vec<Import> {
        let mut imports: Vec<Import> = self
            .module_imports
            .iter()
            .map(|(local, path)| {
                let inferred = path.rsplit("::").next().unwrap_or(path);
                Import {
                    alias: (local != inferred).then(|| local.clone()),
                    path: path.clone(),
                }
            })
            .collect();
        imports.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.alias.cmp(&b.alias)));
        imports
    }

    /// Resolve a type path written in this module.
    ///
    /// Names declared in this module stay identifiers. Names declared in
    /// another loaded module become selectors qualified by that module, or
    /// by the local name of the `use` item that imported it. Names from
    /// outside the crate become identifiers of their last segment.
    pub fn resolve(&self, segments: &[String]) -> TypeExpr {
        let Some((name, prefix)) = segments.split_last() else {
            return TypeExpr::Unsupported("empty path".to_string());
        };

        if prefix.is_empty() {
            return match self.index.lookup(&self.module, name) {
                Some(target) => self.target_expr(target, None),
                None => TypeExpr::ident(name.as_str()),
            };
        }

        let (module, alias) = match prefix {
            [first] if self.module_imports.contains_key(first) => {
                (self.module_imports[first].clone(), Some(first.clone()))
            }
            _ => (self.index.absolutize(&self.module, prefix).join("::"), None),
        };
        if !self.index.contains_module(&module) {
            return TypeExpr::ident(name.as_str());
        }
        match self.index.lookup(&module, name) {
            Some(Target::Declared {
                module: declaring,
                name,
            }) if declaring == module => self.target_expr(
                Target::Declared {
                    module: declaring,
                    name,
                },
                alias,
            ),
            Some(target) => self.target_expr(target, None),
            None => TypeExpr::selector(alias.unwrap_or(module), name.as_str()),
        }
    }

    fn target_expr(&self, target: Target, alias: Option<String>) -> TypeExpr {
        match target {
            Target::Declared { module, name } if module == self.module => TypeExpr::ident(name),
            Target::Declared { module, name } => TypeExpr::selector(alias.unwrap_or(module), name),
            Target::External { name } => TypeExpr::ident(name),
        }
    }
}

/// Context for lowering the types of one declaration.
pub struct TypeContext<'s, 'a> {
    scope: &'s Scope<'a>,
    generics: HashSet<String>,
    self_name: String,
}

impl<'s, 'a> TypeContext<'s, 'a> {
    pub fn new(scope: &'s Scope<'a>, generics: &syn::Generics, self_name: &syn::Ident) -> Self {
        Self {
            scope,
            generics: generics
                .type_params()
                .map(|param| param.ident.to_string())
                .collect(),
            self_name: self_name.unraw().to_string(),
        }
    }

    pub fn lower(&self, ty: &syn::Type) -> TypeExpr {
        match ty {
            syn::Type::Path(type_path) if type_path.qself.is_none() => self.lower_path(&type_path.path),
            // `<T as Trait>::Assoc`
            syn::Type::Path(_) => TypeExpr::Interface,
            syn::Type::Reference(reference) => TypeExpr::pointer(self.lower(&reference.elem)),
            syn::Type::Ptr(pointer) => TypeExpr::pointer(self.lower(&pointer.elem)),
            syn::Type::Slice(slice) => TypeExpr::array(self.lower(&slice.elem)),
            syn::Type::Array(array) => TypeExpr::array(self.lower(&array.elem)),
            syn::Type::Paren(paren) => self.lower(&paren.elem),
            syn::Type::Group(group) => self.lower(&group.elem),
            syn::Type::TraitObject(_) | syn::Type::ImplTrait(_) => TypeExpr::Interface,
            syn::Type::Tuple(tuple) if tuple.elems.is_empty() => {
                TypeExpr::Unsupported("unit type".to_string())
            }
            syn::Type::Tuple(_) => TypeExpr::Unsupported("tuple type".to_string()),
            syn::Type::BareFn(_) => TypeExpr::Unsupported("function pointer type".to_string()),
            syn::Type::Never(_) => TypeExpr::Unsupported("never type".to_string()),
            syn::Type::Macro(_) => TypeExpr::Unsupported("type macro".to_string()),
            syn::Type::Infer(_) => TypeExpr::Unsupported("inferred type".to_string()),
            _ => TypeExpr::Unsupported("type".to_string()),
        }
    }

    fn lower_path(&self, path: &syn::Path) -> TypeExpr {
        let Some(last) = path.segments.last() else {
            return TypeExpr::Unsupported("empty path".to_string());
        };
        let name = last.ident.unraw().to_string();

        if path.segments.len() == 1 {
            if self.generics.contains(&name) {
                return TypeExpr::Interface;
            }
            if name == "Self" {
                return self.scope.resolve(&[self.self_name.clone()]);
            }
        }

        let args = type_arguments(&last.arguments);
        match name.as_str() {
            "Option" | "Box" | "Rc" | "Arc" | "Cow" => match args.first() {
                Some(inner) => TypeExpr::pointer(self.lower(inner)),
                None => TypeExpr::Unsupported(format!("{} without a type argument", name)),
            },
            "Vec" | "VecDeque" | "LinkedList" | "BinaryHeap" | "HashSet" | "BTreeSet"
            | "IndexSet" => match args.first() {
                Some(inner) => TypeExpr::array(self.lower(inner)),
                None => TypeExpr::Unsupported(format!("{} without a type argument", name)),
            },
            "HashMap" | "BTreeMap" | "IndexMap" => match (args.first(), args.get(1)) {
                (Some(key), Some(value)) => TypeExpr::map(self.lower(key), self.lower(value)),
                _ => TypeExpr::Unsupported(format!("{} without key and value types", name)),
            },
            "PhantomData" => TypeExpr::Interface,
            _ => {
                let segments: Vec<String> = path
                    .segments
                    .iter()
                    .map(|segment| segment.ident.unraw().to_string())
                    .collect();
                self.scope.resolve(&segments)
            }
        }
    }
}

fn type_arguments(arguments: &syn::PathArguments) -> Vec<&syn::Type> {
    match arguments {
        syn::PathArguments::AngleBracketed(bracketed) => bracketed
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use syn::parse_quote;

    fn index() -> ModuleIndex {
        let mut index = ModuleIndex::new();
        index.add_file(
            "crate",
            &parse_quote! {
                pub mod models;
                use crate::models::Pet;
                use crate::models as m;
                use uuid::Uuid;
                pub struct Order;
            },
        );
        index.add_file(
            "crate::models",
            &parse_quote! {
                pub struct Pet;
                pub struct Tag;
            },
        );
        index
    }

    fn lower_in(index: &ModuleIndex, module: &str, ty: syn::Type) -> TypeExpr {
        let scope = Scope::new(module, index);
        let generics: syn::Generics = parse_quote! { <T> };
        let ident: syn::Ident = parse_quote! { Order };
        TypeContext::new(&scope, &generics, &ident).lower(&ty)
    }

    #[test]
    fn test_wrappers() {
        let index = index();
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { Option<Box<u32>> }),
            TypeExpr::pointer(TypeExpr::pointer(TypeExpr::ident("u32")))
        );
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { std::collections::HashMap<String, Vec<i64>> }),
            TypeExpr::map(TypeExpr::ident("String"), TypeExpr::array(TypeExpr::ident("i64")))
        );
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { Cow<'static, str> }),
            TypeExpr::pointer(TypeExpr::ident("str"))
        );
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { &'a [u8] }),
            TypeExpr::pointer(TypeExpr::array(TypeExpr::ident("u8")))
        );
    }

    #[test]
    fn test_path_resolution() {
        let index = index();
        assert_eq!(lower_in(&index, "crate", parse_quote! { Order }), TypeExpr::ident("Order"));
        assert_eq!(lower_in(&index, "crate", parse_quote! { Self }), TypeExpr::ident("Order"));
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { Pet }),
            TypeExpr::selector("crate::models", "Pet")
        );
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { m::Tag }),
            TypeExpr::selector("m", "Tag")
        );
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { crate::models::Tag }),
            TypeExpr::selector("crate::models", "Tag")
        );
        assert_eq!(
            lower_in(&index, "crate::models", parse_quote! { super::Order }),
            TypeExpr::selector("crate", "Order")
        );
        assert_eq!(lower_in(&index, "crate", parse_quote! { Uuid }), TypeExpr::ident("Uuid"));
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { chrono::DateTime<chrono::Utc> }),
            TypeExpr::ident("DateTime")
        );
    }

    #[test]
    fn test_opaque_and_unsupported_types() {
        let index = index();
        assert_eq!(lower_in(&index, "crate", parse_quote! { T }), TypeExpr::Interface);
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { Box<dyn std::error::Error> }),
            TypeExpr::pointer(TypeExpr::Interface)
        );
        assert_eq!(
            lower_in(&index, "crate", parse_quote! { PhantomData<T> }),
            TypeExpr::Interface
        );
        assert!(matches!(
            lower_in(&index, "crate", parse_quote! { (u32, u32) }),
            TypeExpr::Unsupported(_)
        ));
        assert!(matches!(
            lower_in(&index, "crate", parse_quote! { fn(u32) -> u32 }),
            TypeExpr::Unsupported(_)
        ));
    }

    #[test]
    fn test_imports() {
        let index = index();
        let scope = Scope::new("crate", &index);
        assert_eq!(
            scope.imports(),
            vec![Import {
                alias: Some("m".to_string()),
                path: "crate::models".to_string(),
            }]
        );
    }
}
