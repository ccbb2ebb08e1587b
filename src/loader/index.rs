//! Module tree of a parsed crate: the type names each module declares and
//! the `use` items that bring other names into it.

use log::debug;
use std::collections::{BTreeMap, HashSet};
use syn::visit::Visit;

/// Bound on `use` indirections followed when looking a name up.
const MAX_REEXPORT_DEPTH: usize = 16;

/// One name or glob brought into scope by a `use` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseEntry {
    /// `use a::b::Name;` or `use a::b::Name as Local;`
    Name { local: String, path: Vec<String> },
    /// `use a::b::*;`
    Glob { path: Vec<String> },
}

/// Where a name visible in some module comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Declared in a loaded module
    Declared { module: String, name: String },
    /// Imported from outside the loaded crate
    External { name: String },
}

#[derive(Debug, Default)]
struct ModuleInfo {
    types: HashSet<String>,
    uses: Vec<UseEntry>,
}

/// Index of every module of the crate being loaded.
#[derive(Debug, Default)]
pub struct ModuleIndex {
    modules: BTreeMap<String, ModuleInfo>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the items of a file whose top level is `module`.
    pub fn add_file(&mut self, module: &str, file: &syn::File) {
        let mut collector = IndexCollector {
            index: self,
            stack: vec![module.to_string()],
        };
        collector.enter(module);
        collector.visit_file(file);
    }

    pub fn contains_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// The `use` entries of a module.
    pub fn uses(&self, module: &str) -> &[UseEntry] {
        self.modules
            .get(module)
            .map(|info| info.uses.as_slice())
            .unwrap_or_default()
    }

    pub fn declares(&self, module: &str, name: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|info| info.types.contains(name))
    }

    /// Turn a path written in a `use` item of `module` into an absolute one.
    ///
    /// `crate`, `self` and `super` are resolved against `module`; a first
    /// segment naming a child module is taken relative to `module`. Anything
    /// else is an external path and is returned unchanged.
    pub fn absolutize_use(&self, module: &str, segments: &[String]) -> Vec<String> {
        let Some(first) = segments.first() else {
            return Vec::new();
        };
        let mut base: Vec<String> = module.split("::").map(str::to_string).collect();
        match first.as_str() {
            "crate" => segments.to_vec(),
            "self" => {
                base.extend_from_slice(&segments[1..]);
                base
            }
            "super" => {
                let mut rest = segments;
                while rest.first().is_some_and(|s| s == "super") {
                    if base.len() > 1 {
                        base.pop();
                    }
                    rest = &rest[1..];
                }
                base.extend_from_slice(rest);
                base
            }
            _ if self.contains_module(&format!("{}::{}", module, first)) => {
                base.extend_from_slice(segments);
                base
            }
            _ => segments.to_vec(),
        }
    }

    /// Turn a path written in the body of `module` into an absolute one.
    ///
    /// Like [`absolutize_use`](Self::absolutize_use), but a first segment
    /// brought in by a `use` item is replaced by what it names.
    pub fn absolutize(&self, module: &str, segments: &[String]) -> Vec<String> {
        if let Some(first) = segments.first() {
            let imported = self.uses(module).iter().find_map(|entry| match entry {
                UseEntry::Name { local, path } if local == first => Some(path),
                _ => None,
            });
            if let Some(path) = imported {
                let mut absolute = self.absolutize_use(module, path);
                absolute.extend_from_slice(&segments[1..]);
                return absolute;
            }
        }
        self.absolutize_use(module, segments)
    }

    /// Find where `name`, as visible inside `module`, is declared.
    ///
    /// Follows renames, re-exports and globs. `None` when the name is neither
    /// declared in nor imported into the module.
    pub fn lookup(&self, module: &str, name: &str) -> Option<Target> {
        self.lookup_at_depth(module, name, 0)
    }

    fn lookup_at_depth(&self, module: &str, name: &str, depth: usize) -> Option<Target> {
        if depth > MAX_REEXPORT_DEPTH {
            debug!("Giving up on {} in {}: too many re-exports", name, module);
            return None;
        }
        let info = self.modules.get(module)?;
        if info.types.contains(name) {
            return Some(Target::Declared {
                module: module.to_string(),
                name: name.to_string(),
            });
        }

        for entry in &info.uses {
            let UseEntry::Name { local, path } = entry else {
                continue;
            };
            if local != name {
                continue;
            }
            let absolute = self.absolutize_use(module, path);
            let (target_name, target_module) = absolute.split_last()?;
            let target_module = target_module.join("::");
            if self.contains_module(&target_module) {
                return self.lookup_at_depth(&target_module, target_name, depth + 1);
            }
            return Some(Target::External {
                name: target_name.clone(),
            });
        }

        info.uses.iter().find_map(|entry| match entry {
            UseEntry::Glob { path } => {
                let target = self.absolutize_use(module, path).join("::");
                self.lookup_at_depth(&target, name, depth + 1)
            }
            UseEntry::Name { .. } => None,
        })
    }
}

/// Flatten a `use` tree into entries.
pub fn flatten_use(tree: &syn::UseTree, prefix: &mut Vec<String>, out: &mut Vec<UseEntry>) {
    match tree {
        syn::UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            flatten_use(&path.tree, prefix, out);
            prefix.pop();
        }
        syn::UseTree::Name(name) => {
            let ident = name.ident.to_string();
            if ident == "self" {
                if let Some(last) = prefix.last() {
                    out.push(UseEntry::Name {
                        local: last.clone(),
                        path: prefix.clone(),
                    });
                }
            } else {
                let mut path = prefix.clone();
                path.push(ident.clone());
                out.push(UseEntry::Name { local: ident, path });
            }
        }
        syn::UseTree::Rename(rename) => {
            let local = rename.rename.to_string();
            if local == "_" {
                return;
            }
            let mut path = prefix.clone();
            if rename.ident != "self" {
                path.push(rename.ident.to_string());
            }
            out.push(UseEntry::Name { local, path });
        }
        syn::UseTree::Glob(_) => out.push(UseEntry::Glob {
            path: prefix.clone(),
        }),
        syn::UseTree::Group(group) => {
            for item in &group.items {
                flatten_use(item, prefix, out);
            }
        }
    }
}

/// Whether an item is only compiled for tests.
pub fn is_test_only(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .meta
                .require_list()
                .is_ok_and(|list| list.tokens.to_string() == "test")
    })
}

struct IndexCollector<'a> {
    index: &'a mut ModuleIndex,
    stack: Vec<String>,
}

impl IndexCollector<'_> {
    fn enter(&mut self, module: &str) -> &mut ModuleInfo {
        self.index.modules.entry(module.to_string()).or_default()
    }

    fn current(&mut self) -> &mut ModuleInfo {
        let module = self.stack.last().cloned().unwrap_or_else(|| "crate".to_string());
        self.enter(&module)
    }

    fn declare(&mut self, ident: &syn::Ident) {
        use syn::ext::IdentExt;
        let name = ident.unraw().to_string();
        self.current().types.insert(name);
    }
}

impl<'ast> Visit<'ast> for IndexCollector<'_> {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.declare(&node.ident);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.declare(&node.ident);
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        self.declare(&node.ident);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        let mut entries = Vec::new();
        flatten_use(&node.tree, &mut Vec::new(), &mut entries);
        self.current().uses.extend(entries);
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if is_test_only(&node.attrs) {
            return;
        }
        let Some((_, items)) = &node.content else {
            return;
        };
        let parent = self.stack.last().cloned().unwrap_or_else(|| "crate".to_string());
        let module = format!("{}::{}", parent, node.ident);
        self.enter(&module);
        self.stack.push(module);
        for item in items {
            self.visit_item(item);
        }
        self.stack.pop();
    }

    // Items nested in function bodies, impls and traits are not reachable
    // by path.
    fn visit_item_fn(&mut self, _node: &'ast syn::ItemFn) {}

    fn visit_item_impl(&mut self, _node: &'ast syn::ItemImpl) {}

    fn visit_item_trait(&mut self, _node: &'ast syn::ItemTrait) {}

    fn visit_item_const(&mut self, _node: &'ast syn::ItemConst) {}

    fn visit_item_static(&mut self, _node: &'ast syn::ItemStatic) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn segments(path: &str) -> Vec<String> {
        path.split("::").map(str::to_string).collect()
    }

    fn index() -> ModuleIndex {
        let mut index = ModuleIndex::new();
        index.add_file(
            "crate",
            &parse_quote! {
                pub mod models;
                use crate::models::pet::Pet as Animal;
                use chrono::{DateTime, Utc};
                pub struct Root;
                fn helper() { struct Hidden; }
                #[cfg(test)]
                mod tests { struct Fixture; }
            },
        );
        index.add_file(
            "crate::models",
            &parse_quote! {
                pub mod pet;
                pub use self::pet::*;
                pub use pet::Tag as Label;
                mod inline { pub struct Inner; }
            },
        );
        index.add_file(
            "crate::models::pet",
            &parse_quote! {
                use super::super::Root;
                pub struct Pet;
                pub struct Tag;
                pub enum Status { Sold }
                pub type Tags = Vec<Tag>;
            },
        );
        index
    }

    #[test]
    fn test_modules_and_types() {
        let index = index();
        let modules: Vec<&str> = index.modules().collect();
        assert_eq!(
            modules,
            vec!["crate", "crate::models", "crate::models::inline", "crate::models::pet"]
        );
        assert!(index.declares("crate", "Root"));
        assert!(!index.declares("crate", "Hidden"));
        assert!(!index.declares("crate", "Fixture"));
        assert!(index.declares("crate::models::pet", "Tags"));
        assert!(index.declares("crate::models::inline", "Inner"));
    }

    #[test]
    fn test_absolutize() {
        let index = index();
        assert_eq!(
            index.absolutize_use("crate::models::pet", &segments("super::super::Root")),
            segments("crate::Root")
        );
        assert_eq!(
            index.absolutize_use("crate::models", &segments("self::pet::Pet")),
            segments("crate::models::pet::Pet")
        );
        assert_eq!(
            index.absolutize_use("crate::models", &segments("pet::Pet")),
            segments("crate::models::pet::Pet")
        );
        assert_eq!(
            index.absolutize_use("crate", &segments("chrono::DateTime")),
            segments("chrono::DateTime")
        );
        assert_eq!(
            index.absolutize("crate", &segments("Animal")),
            segments("crate::models::pet::Pet")
        );
    }

    #[test]
    fn test_lookup_follows_imports() {
        let index = index();
        let pet = Target::Declared {
            module: "crate::models::pet".to_string(),
            name: "Pet".to_string(),
        };
        assert_eq!(index.lookup("crate", "Animal"), Some(pet.clone()));
        assert_eq!(index.lookup("crate::models", "Pet"), Some(pet));
        assert_eq!(
            index.lookup("crate::models", "Label"),
            Some(Target::Declared {
                module: "crate::models::pet".to_string(),
                name: "Tag".to_string(),
            })
        );
        assert_eq!(
            index.lookup("crate", "DateTime"),
            Some(Target::External {
                name: "DateTime".to_string()
            })
        );
        assert_eq!(index.lookup("crate", "Missing"), None);
    }

    #[test]
    fn test_flatten_use_groups() {
        let item: syn::ItemUse = parse_quote! {
            use crate::models::{self, pet::{Pet, Tag as Label}, inline::*};
        };
        let mut entries = Vec::new();
        flatten_use(&item.tree, &mut Vec::new(), &mut entries);
        assert_eq!(
            entries,
            vec![
                UseEntry::Name {
                    local: "models".to_string(),
                    path: segments("crate::models"),
                },
                UseEntry::Name {
                    local: "Pet".to_string(),
                    path: segments("crate::models::pet::Pet"),
                },
                UseEntry::Name {
                    local: "Label".to_string(),
                    path: segments("crate::models::pet::Tag"),
                },
                UseEntry::Glob {
                    path: segments("crate::models::inline"),
                },
            ]
        );
    }
}
