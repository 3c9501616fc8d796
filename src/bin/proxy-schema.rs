//! Proxy Schema CLI
//!
//! Command-line interface for dereferencing, narrowing and checking proxy
//! configuration schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use proxy_schema::{
    extract_property, extract_subtype, lint, load_schema, load_schema_auto, resolve,
    resolve_with_root, schema_endpoint, validate_variant, variant_names, FileStatus, Protocol,
    ResourceKind, Severity, ValidateError, Variant,
};

#[derive(Parser)]
#[command(name = "proxy-schema")]
#[command(about = "Dereference and narrow reverse-proxy configuration schemas")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where to read a schema from: a file, a URL, or the dashboard backend.
#[derive(Args)]
struct SchemaSource {
    /// Schema source: file path or URL (http:// or https://)
    schema: Option<String>,

    /// Dashboard backend base URL; fetches /api/{protocol}/{kind}/schema.json
    /// (a positional schema takes precedence)
    #[arg(long, env = "PROXY_SCHEMA_SERVER")]
    server: Option<String>,

    /// Protocol of the schema to fetch from --server [default: http]
    #[arg(long, requires = "server")]
    protocol: Option<Protocol>,

    /// Resource kind of the schema to fetch from --server
    #[arg(long, requires = "server")]
    kind: Option<ResourceKind>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (stdout if not specified)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace every $ref with its target and drop $defs/definitions
    Resolve {
        #[command(flatten)]
        source: SchemaSource,

        /// Resolve pointers against this document instead of the schema itself
        #[arg(long)]
        root: Option<String>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Extract the schema of one service variant
    Extract {
        #[command(flatten)]
        source: SchemaSource,

        /// Variant to extract: loadBalancer, weighted, mirroring, failover
        #[arg(long)]
        variant: Variant,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// List the variants offered by a schema's oneOf union
    Variants {
        #[command(flatten)]
        source: SchemaSource,
    },

    /// Extract one property schema (e.g. a middleware type), resolved against the whole schema
    Property {
        #[command(flatten)]
        source: SchemaSource,

        /// Property name (e.g. rateLimit, basicAuth)
        #[arg(long)]
        name: String,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Validate a service configuration against its variant schema
    Validate {
        /// Configuration file to validate
        config: PathBuf,

        /// Services schema: file path or URL
        #[arg(long)]
        schema: String,

        /// Variant the configuration uses
        #[arg(long)]
        variant: Variant,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Lint schema files for errors (syntax, broken refs, cycles, ambiguous unions)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Resolve { source, root, out } => run_resolve(&source, root.as_deref(), &out),
        Commands::Extract {
            source,
            variant,
            out,
        } => run_extract(&source, variant, &out),
        Commands::Variants { source } => run_variants(&source),
        Commands::Property { source, name, out } => run_property(&source, &name, &out),
        Commands::Validate {
            config,
            schema,
            variant,
            json,
        } => run_validate(&config, &schema, variant, json),
        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

impl SchemaSource {
    /// Load the schema, fetching `default_kind` from --server when --kind is absent.
    fn load(&self, default_kind: Option<ResourceKind>) -> Result<Value, u8> {
        let location = match (&self.schema, &self.server) {
            (Some(schema), _) => {
                if self.protocol.is_some() || self.kind.is_some() {
                    tracing::warn!(
                        source = %schema,
                        "--protocol and --kind only apply to --server; ignoring them"
                    );
                }
                schema.clone()
            }
            (None, Some(server)) => {
                let Some(kind) = self.kind.or(default_kind) else {
                    eprintln!("Error: --kind is required with --server");
                    return Err(2);
                };
                let protocol = self.protocol.unwrap_or(Protocol::Http);
                schema_endpoint(server, protocol, kind).map_err(|e| {
                    eprintln!("Error: {}", e);
                    e.exit_code() as u8
                })?
            }
            (None, None) => {
                eprintln!("Error: a schema path, URL, or --server is required");
                return Err(2);
            }
        };

        tracing::info!(source = %location, "loading schema");
        load_schema_auto(&location).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })
    }
}

fn run_resolve(source: &SchemaSource, root: Option<&str>, out: &OutputArgs) -> Result<(), u8> {
    let schema = source.load(None)?;

    let resolved = match root {
        Some(root_source) => {
            let root = load_schema_auto(root_source).map_err(|e| {
                eprintln!("Error loading root: {}", e);
                e.exit_code() as u8
            })?;
            resolve_with_root(&schema, &root)
        }
        None => resolve(&schema),
    }
    .map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    write_json(&resolved, out)
}

fn run_extract(source: &SchemaSource, variant: Variant, out: &OutputArgs) -> Result<(), u8> {
    let schema = source.load(Some(ResourceKind::Services))?;

    let narrowed = extract_subtype(&schema, variant).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    write_json(&narrowed, out)
}

fn run_variants(source: &SchemaSource) -> Result<(), u8> {
    let schema = source.load(Some(ResourceKind::Services))?;

    let names = variant_names(&schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn run_property(source: &SchemaSource, name: &str, out: &OutputArgs) -> Result<(), u8> {
    let schema = source.load(Some(ResourceKind::Middlewares))?;

    let property = extract_property(&schema, name).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    write_json(&property, out)
}

fn write_json(value: &Value, out: &OutputArgs) -> Result<(), u8> {
    let json_output = if out.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match &out.output {
        Some(path) => {
            std::fs::write(path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_validate(
    config_path: &Path,
    schema_source: &str,
    variant: Variant,
    json_output: bool,
) -> Result<(), u8> {
    let config = load_schema(config_path).map_err(|e| {
        report_error(json_output, &format!("loading config: {}", e));
        e.exit_code() as u8
    })?;

    let schema = load_schema_auto(schema_source).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;

    match validate_variant(&schema, variant, &config) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(ValidateError::Resolve(e)) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
