//! Schema From Source - Command-line tool for generating schema definitions.
//!
//! This binary loads a Rust project (or a serialized program document), turns every
//! type declaration into a schema definition guided by the annotations in its doc
//! comments, follows references across modules, and writes the resulting
//! `definitions` document.
//!
//! # Usage
//!
//! ```bash
//! schema-from-source [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Generate YAML definitions:
//! ```bash
//! schema-from-source ./my-project -o definitions.yaml
//! ```
//!
//! Generate JSON definitions for marked models only:
//! ```bash
//! schema-from-source ./my-project --annotated-only -f json -o definitions.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! schema-from-source ./my-project -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use schema_from_source::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag, then validate after logger init
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Schema From Source starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Schema generation completed successfully");

    Ok(())
}
