//! Schema From Source - Schema definitions from annotated type declarations.
//!
//! This library turns the type declarations of a program into a flat map of named
//! schema definitions. Doc comments drive the result: `swagger:model` lines rename
//! and mark models, `swagger:strfmt` lines map a type to a formatted string,
//! `swagger:allOf` marks embedded types as composition members, and keyword lines
//! such as `minimum: 3` or `pattern: ^\w+$` attach validation constraints.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into syntax trees
//! 3. [`loader`] - Lowers syntax trees into a [`program::Program`]
//! 4. [`annotation`], [`directive`] and [`tag`] - Read doc comments and serialization tags
//! 5. [`resolver`] - Finds declarations within and across packages
//! 6. [`synthesizer`] and [`mapper`] - Build schemas, flatten embedded types and map field types
//! 7. [`worklist`] - Defers referenced declarations until the scan reaches them
//! 8. [`serializer`] - Serializes the definitions to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use schema_from_source::{
//!     binding::RustBinding,
//!     loader::ProgramLoader,
//!     serializer::serialize_yaml,
//!     synthesizer::{ScanOptions, Scanner},
//! };
//! use std::path::Path;
//!
//! let program = ProgramLoader::load(Path::new("./my-project")).unwrap();
//! let binding = RustBinding::new();
//! let definitions = Scanner::new(&program, &binding)
//!     .with_options(ScanOptions { annotated_only: true })
//!     .run()
//!     .unwrap();
//!
//! println!("{}", serialize_yaml(&definitions).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod binding;
pub mod cli;
pub mod declaration;
pub mod directive;
pub mod error;
pub mod loader;
pub mod mapper;
pub mod parser;
pub mod program;
pub mod resolver;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod synthesizer;
pub mod tag;
pub mod worklist;
