use crate::binding::RustBinding;
use crate::loader::ProgramLoader;
use crate::program::Program;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::synthesizer::{ScanOptions, Scanner};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Schema From Source - Generate schema definitions from annotated type declarations
#[derive(Parser, Debug)]
#[command(name = "schema-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a Rust project directory or a .json/.yaml/.yml program document
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Only collect declarations marked with `swagger:model`
    #[arg(long = "annotated-only")]
    pub annotated_only: bool,

    /// Only emit `pub` fields
    #[arg(long = "public-only")]
    pub public_only: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Where the program is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A Rust project directory
    Project,
    /// A JSON program document
    JsonDocument,
    /// A YAML program document
    YamlDocument,
}

impl InputKind {
    /// Classify an input path, or `None` for files of an unknown kind.
    pub fn of(path: &Path) -> Option<Self> {
        if path.is_dir() {
            return Some(InputKind::Project);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(InputKind::JsonDocument),
            Some("yaml") | Some("yml") => Some(InputKind::YamlDocument),
            _ => None,
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }

    let Some(kind) = InputKind::of(&args.input) else {
        anyhow::bail!(
            "Input must be a project directory or a .json, .yaml or .yml file: {}",
            args.input.display()
        );
    };

    info!("Input: {} ({:?})", args.input.display(), kind);
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if args.annotated_only {
        info!("Collecting annotated declarations only");
    }
    if args.public_only {
        info!("Emitting public fields only");
    }

    Ok(args)
}

/// Load the program named by `input`.
///
/// # Errors
///
/// Returns an error if the input cannot be read, scanned or deserialized.
pub fn load_program(input: &Path) -> Result<Program> {
    match InputKind::of(input) {
        Some(InputKind::Project) => ProgramLoader::load(input),
        Some(InputKind::JsonDocument) => {
            let content = read_document(input)?;
            Program::from_json_str(&content)
                .with_context(|| format!("Failed to read program document {}", input.display()))
        }
        Some(InputKind::YamlDocument) => {
            let content = read_document(input)?;
            Program::from_yaml_str(&content)
                .with_context(|| format!("Failed to read program document {}", input.display()))
        }
        None => anyhow::bail!("Unsupported input: {}", input.display()),
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting schema generation...");

    // Step 1: Load the program
    info!("Loading program from {}...", args.input.display());
    let program = load_program(&args.input)?;
    let file_count = program.files().count();
    info!(
        "Loaded {} packages with {} files",
        program.packages.len(),
        file_count
    );
    if file_count == 0 {
        log::warn!("No source files found in {}", args.input.display());
    }

    // Step 2: Synthesize definitions
    info!("Synthesizing schemas...");
    let binding = if args.public_only {
        RustBinding::public_fields_only()
    } else {
        RustBinding::new()
    };
    let options = ScanOptions {
        annotated_only: args.annotated_only,
    };
    let definitions = Scanner::new(&program, &binding)
        .with_options(options)
        .run()
        .context("Schema synthesis failed")?;

    // Step 3: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&definitions)?,
        OutputFormat::Json => serialize_json(&definitions)?,
    };

    // Step 4: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote definitions to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Packages loaded: {}", program.packages.len());
    info!("  - Files scanned: {}", file_count);
    info!("  - Definitions: {}", definitions.len());

    Ok(())
}
