//! API Guidance CLI
//!
//! Command-line interface for projecting guidance contracts and validating
//! drafts against them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use api_guidance::{
    load_document_auto, load_policy_table, project_with, render_document, validate, Context,
    Format, GuidanceOptions, PolicyTable, UseCase, UserDraft, UserRole, ValidateError, Verb,
    DEFAULT_PATH,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "api-guidance")]
#[command(about = "Project context-specific guidance contracts from an OpenAPI document")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a full contract down to one operation tailored to a context
    Project {
        /// Contract source: file path (JSON or YAML) or URL (http:// or https://)
        document: String,

        #[command(flatten)]
        selection: Selection,

        /// Output format: yaml (default) or json
        #[arg(long, default_value = "yaml")]
        format: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a draft payload against the projected guidance contract
    Validate {
        /// Contract source: file path (JSON or YAML) or URL
        document: String,

        /// Draft payload file (JSON)
        payload: PathBuf,

        #[command(flatten)]
        selection: Selection,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct Selection {
    /// Path of the operation, matched case-insensitively
    #[arg(long, default_value = DEFAULT_PATH)]
    path: String,

    /// Operation verb (get, put, post, delete, ...)
    #[arg(long, default_value = "post")]
    verb: Verb,

    /// Use case: default, client-creation, user-creation, lightweight-client
    #[arg(long, default_value = "default")]
    use_case: String,

    /// Caller role; repeat for several. Only the first drives role-dependent policies
    #[arg(long = "role", conflicts_with = "draft")]
    roles: Vec<UserRole>,

    /// Take roles from a draft record (JSON) instead of --role
    #[arg(long)]
    draft: Option<PathBuf>,

    /// Policy table (YAML or JSON) replacing the built-in rules
    #[arg(long)]
    policy: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Project {
            document,
            selection,
            format,
            pretty,
            output,
        } => run_project(&document, &selection, &format, pretty, output),

        Commands::Validate {
            document,
            payload,
            selection,
            json,
        } => run_validate(&document, &payload, &selection, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_project(
    source: &str,
    selection: &Selection,
    format: &str,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    let format = Format::parse(format, pretty).ok_or_else(|| {
        eprintln!("Error: unknown format \"{}\": expected yaml or json", format);
        2u8
    })?;
    let (options, policies) = selection.resolve(&|msg: &str| eprintln!("Error: {}", msg))?;

    let document = load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let guidance = project_with(document, &options, &policies).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let text = render_document(&guidance, format).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &text).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}

fn run_validate(
    source: &str,
    payload_path: &Path,
    selection: &Selection,
    json_output: bool,
) -> Result<(), u8> {
    let report = |msg: &str| report_error(json_output, msg);

    let (options, policies) = selection.resolve(&report)?;

    let payload = read_json(payload_path).map_err(|(code, msg)| {
        report(&format!("loading payload: {}", msg));
        code
    })?;

    let document = load_document_auto(source).map_err(|e| {
        report(&format!("loading document: {}", e));
        e.exit_code() as u8
    })?;

    match validate(document, &payload, &options, &policies) {
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
        Err(e @ ValidateError::Guidance(_)) => {
            report(&e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

impl Selection {
    /// Turn flags into projection options and the policy table to apply.
    fn resolve(&self, report: &dyn Fn(&str)) -> Result<(GuidanceOptions, PolicyTable), u8> {
        let use_case = self.use_case.parse::<UseCase>().map_err(|e| {
            report(&e.to_string());
            2u8
        })?;

        let context = match &self.draft {
            Some(path) => {
                let value = read_json(path).map_err(|(code, msg)| {
                    report(&format!("loading draft: {}", msg));
                    code
                })?;
                let draft: UserDraft = serde_json::from_value(value).map_err(|e| {
                    report(&format!("invalid draft: {}", e));
                    2u8
                })?;
                draft.context(use_case)
            }
            None => Context::new(use_case, self.roles.clone()),
        };

        let policies = match &self.policy {
            Some(path) => load_policy_table(path).map_err(|e| {
                report(&format!("loading policy table: {}", e));
                e.exit_code() as u8
            })?,
            None => PolicyTable::builtin(),
        };

        let options = GuidanceOptions::new(self.path.clone(), self.verb).context(context);
        Ok((options, policies))
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, (u8, String)> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| (3u8, format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| (2u8, format!("invalid JSON: {}", e)))
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
