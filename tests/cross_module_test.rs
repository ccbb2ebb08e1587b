// Cross-module resolution: imports, aliases, re-exports and inline modules
use pretty_assertions::assert_eq;
use schema_from_source::binding::RustBinding;
use schema_from_source::error::Error;
use schema_from_source::loader::ProgramLoader;
use schema_from_source::parser::{AstParser, ParsedFile};
use schema_from_source::program::Program;
use schema_from_source::schema::Definitions;
use schema_from_source::synthesizer::Scanner;
use std::path::Path;

fn load(files: &[(&str, &str)]) -> Program {
    let parsed: Vec<ParsedFile> = files
        .iter()
        .map(|(path, source)| {
            AstParser::parse_source(Path::new(path), source).expect("Failed to parse source")
        })
        .collect();
    ProgramLoader::from_parsed(Path::new("src"), &parsed)
}

fn synthesize(program: &Program) -> Definitions {
    let binding = RustBinding::new();
    Scanner::new(program, &binding)
        .run()
        .expect("Failed to synthesize definitions")
}

#[test]
fn test_aliased_module_and_glob_reexport() {
    let program = load(&[
        ("src/lib.rs", "pub mod models; pub mod api;"),
        ("src/models/mod.rs", "mod pet; pub use pet::*;"),
        (
            "src/models/pet.rs",
            r#"
            /// swagger:model pet
            pub struct Pet { pub id: u64 }
            "#,
        ),
        (
            "src/api.rs",
            r#"
            use crate::models as m;

            pub struct Listing {
                pub pet: m::Pet,
                pub featured: Vec<crate::models::Pet>,
            }
            "#,
        ),
    ]);

    let definitions = synthesize(&program);
    let listing = &definitions["Listing"];
    assert_eq!(
        listing.properties["pet"].reference.as_deref(),
        Some("#/definitions/pet")
    );
    let featured = listing.properties["featured"].items.as_ref().unwrap();
    assert_eq!(featured.reference.as_deref(), Some("#/definitions/pet"));
    assert_eq!(
        definitions["pet"].extensions["x-rust-package"],
        "crate::models::pet"
    );
}

#[test]
fn test_inline_module_is_its_own_package() {
    let program = load(&[(
        "src/lib.rs",
        r#"
        pub struct Tree {
            pub root: inner::Leaf,
        }

        pub mod inner {
            pub struct Leaf { pub id: u32 }
        }
        "#,
    )]);

    assert!(program.package("crate::inner").is_some());
    let definitions = synthesize(&program);
    assert_eq!(
        definitions["Tree"].properties["root"].reference.as_deref(),
        Some("#/definitions/Leaf")
    );
    assert_eq!(definitions["Leaf"].extensions["x-rust-package"], "crate::inner");
}

#[test]
fn test_own_field_overrides_embedded_field() {
    let program = load(&[(
        "src/lib.rs",
        r#"
        pub struct Base {
            /// The base name
            ///
            /// minLength: 1
            pub name: String,
            pub created: u64,
        }

        pub struct Named {
            #[serde(flatten)]
            pub base: Base,
            /// maxLength: 5
            pub name: String,
        }
        "#,
    )]);

    let definitions = synthesize(&program);
    let named = &definitions["Named"];
    let name = &named.properties["name"];
    assert_eq!(name.max_length, Some(5));
    assert_eq!(name.min_length, None);
    assert_eq!(name.description, None);
    assert!(named.properties.contains_key("created"));
}

#[test]
fn test_same_model_name_keeps_last_shape() {
    let program = load(&[
        ("src/lib.rs", "pub mod v1; pub mod v2;"),
        (
            "src/v1.rs",
            r#"
            /// swagger:model item
            pub struct Item {
                pub id: u64,
                /// required: true
                pub legacy: String,
            }
            "#,
        ),
        (
            "src/v2.rs",
            r#"
            /// swagger:model item
            pub struct Item {
                pub id: u64,
            }
            "#,
        ),
    ]);

    let definitions = synthesize(&program);
    let item = &definitions["item"];
    let properties: Vec<&str> = item.properties.keys().map(String::as_str).collect();
    assert_eq!(properties, vec!["id"]);
    assert!(item.required.is_empty());
    assert_eq!(item.extensions["x-rust-package"], "crate::v2");
}

#[test]
fn test_recursive_types() {
    let program = load(&[(
        "src/lib.rs",
        r#"
        pub struct Node {
            pub children: Vec<Node>,
            pub parent: Option<Box<Node>>,
        }

        pub type Forest = Vec<Forest>;
        "#,
    )]);

    let definitions = synthesize(&program);
    let node = &definitions["Node"];
    assert_eq!(
        node.properties["parent"].reference.as_deref(),
        Some("#/definitions/Node")
    );
    let children = node.properties["children"].items.as_ref().unwrap();
    assert_eq!(children.reference.as_deref(), Some("#/definitions/Node"));

    let forest = &definitions["Forest"];
    assert_eq!(forest.schema_type.as_deref(), Some("array"));
    let items = forest.items.as_ref().unwrap();
    assert_eq!(items.reference.as_deref(), Some("#/definitions/Forest"));
}

#[test]
fn test_unknown_module_path_falls_back_to_primitives() {
    let program = load(&[(
        "src/lib.rs",
        r#"
        pub struct Event {
            pub id: uuid::Uuid,
            pub at: std::time::SystemTime,
            pub payload: serde_json::Value,
        }
        "#,
    )]);

    let definitions = synthesize(&program);
    let event = &definitions["Event"];
    assert_eq!(event.properties["id"].format.as_deref(), Some("uuid"));
    assert_eq!(event.properties["at"].format.as_deref(), Some("date-time"));
    assert_eq!(event.properties["payload"].schema_type.as_deref(), Some("object"));
}

#[test]
fn test_trait_object_fields_are_skipped() {
    let program = load(&[(
        "src/lib.rs",
        r#"
        pub struct Envelope {
            pub payload: Box<dyn std::any::Any>,
            pub kind: String,
        }
        "#,
    )]);

    let definitions = synthesize(&program);
    let keys: Vec<&str> = definitions["Envelope"]
        .properties
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["kind"]);
}

#[test]
fn test_cyclic_flatten_is_rejected() {
    let program = load(&[(
        "src/lib.rs",
        r#"
        pub struct A {
            #[serde(flatten)]
            pub b: Option<Box<B>>,
        }

        pub struct B {
            #[serde(flatten)]
            pub a: Option<Box<A>>,
        }
        "#,
    )]);

    let binding = RustBinding::new();
    let err = Scanner::new(&program, &binding).run().unwrap_err();
    assert!(matches!(err, Error::UnsupportedConstruct(_)), "unexpected error: {}", err);
    assert!(err.to_string().contains("cyclic embedding"));
}

#[test]
fn test_model_revisited_as_struct_drops_alias_shape() {
    let program = load(&[
        ("src/lib.rs", "pub mod a; pub mod b;"),
        (
            "src/a.rs",
            r#"
            /// swagger:model item
            pub type Item = Vec<String>;
            "#,
        ),
        (
            "src/b.rs",
            r#"
            /// swagger:model item
            pub struct Item { pub id: u64 }
            "#,
        ),
    ]);

    let definitions = synthesize(&program);
    let item = serde_json::to_value(&definitions["item"]).unwrap();
    assert_eq!(
        item,
        serde_json::json!({
            "type": "object",
            "properties": {"id": {"type": "integer", "format": "uint64"}},
            "x-rust-name": "Item",
            "x-rust-package": "crate::b"
        })
    );
}
