use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use formloom_core::{Answers, Severity};
use formloom_editor::{DEFAULT_HISTORY_CAPACITY, Editor, EditorConfig, ExportEnvelope, parse_envelope};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod display;

#[derive(Parser)]
#[command(name = "formloom", version)]
#[command(about = "Normalize form JSON, validate schemas, and evaluate field rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the detected source format of a form document
    Detect { file: PathBuf },
    /// Normalize an external form document
    Normalize {
        file: PathBuf,
        /// Slugs already taken, comma-separated
        #[arg(long, env = "FORMLOOM_EXISTING_SLUGS", value_delimiter = ',')]
        existing: Vec<String>,
        /// Print an export envelope of the converted schema instead of the
        /// normalization result
        #[arg(long)]
        schema: bool,
    },
    /// Validate an exported schema; exits 1 when any error is found
    Validate {
        envelope: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Evaluate field rules and section triggers against an answers file
    Evaluate {
        envelope: PathBuf,
        answers: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(Args)]
struct SessionArgs {
    /// Undo snapshots kept by the editing session
    #[arg(long, env = "FORMLOOM_HISTORY_CAPACITY", default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,
}

impl SessionArgs {
    fn open(&self, path: &Path) -> Result<Editor> {
        let text = read_text(path)?;
        let envelope = parse_envelope(&text)
            .with_context(|| format!("invalid export envelope: {}", path.display()))?;
        Ok(Editor::with_config(
            envelope.schema,
            EditorConfig {
                history_capacity: self.history_capacity,
            },
        ))
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Detect { file } => {
            let input = read_json(&file)?;
            match formloom_normalize::detect_format(&input) {
                Some(format) => println!("{format}"),
                None => bail!("unrecognized form format: {}", file.display()),
            }
        }
        Command::Normalize {
            file,
            existing,
            schema,
        } => {
            let input = read_json(&file)?;
            let result = formloom_normalize::normalize(&input, &existing_slugs(existing))
                .with_context(|| format!("failed to normalize {}", file.display()))?;
            let output = if schema {
                ExportEnvelope::new(result.to_schema()).to_json()?
            } else {
                serde_json::to_string_pretty(&result)?
            };
            println!("{output}");
        }
        Command::Validate { envelope, session } => {
            let mut editor = session.open(&envelope)?;
            let issues = editor.validate();
            display::print_issues(issues);
            let errors = issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .count();
            info!(issues = issues.len(), errors, "validated schema");
            if errors > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Evaluate {
            envelope,
            answers,
            session,
        } => {
            let editor = session.open(&envelope)?;
            let answers = read_answers(&answers)?;
            display::print_evaluation(editor.schema(), &answers);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_answers(path: &Path) -> Result<Answers> {
    match read_json(path)? {
        Value::Object(answers) => Ok(answers),
        _ => bail!("answers file must contain a JSON object: {}", path.display()),
    }
}

fn existing_slugs(raw: Vec<String>) -> HashSet<String> {
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
