use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kestrel_ast::ast::Program;
use kestrel_cli::{global_context, render_error, SingleSource, MAX_SOURCE_SIZE};
use kestrel_parse::parse_str;
use kestrel_runtime::RuntimeError;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(about = "Kestrel: a small prototype-based scripting language")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a Kestrel program
    Run {
        /// Path to .ks source file
        file: PathBuf,

        /// Directory searched by `require`, in order (repeatable)
        #[arg(short = 'I', long = "include")]
        include: Vec<PathBuf>,
    },

    /// Parse a source file and dump the AST
    Parse {
        /// Path to .ks source file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
}

#[derive(ValueEnum, Clone, Debug)]
enum Format {
    Pretty,
    Json,
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    file: &'a str,
    program: &'a Program,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { file, include } => cmd_run(&file, include),
        Commands::Parse { file, format } => cmd_parse(&file, format),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logging stays off unless `KESTREL_LOG` holds a filter directive.
fn init_tracing() {
    let Ok(directives) = std::env::var("KESTREL_LOG") else {
        return;
    };
    match EnvFilter::try_new(&directives) {
        Ok(filter) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .without_time()
            .init(),
        Err(e) => eprintln!("warning: ignoring KESTREL_LOG={directives:?}: {e}"),
    }
}

fn read_source(path: &Path) -> Result<String> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    if src.len() > MAX_SOURCE_SIZE {
        bail!(
            "source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        );
    }
    Ok(src)
}

/// `-I` directories first, then the entries of `KESTREL_PATH`.
fn search_paths(include: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut paths = include;
    if let Some(env_paths) = std::env::var_os("KESTREL_PATH") {
        paths.extend(std::env::split_paths(&env_paths).filter(|p| !p.as_os_str().is_empty()));
    }
    paths
}

fn cmd_run(file: &Path, include: Vec<PathBuf>) -> Result<ExitCode> {
    let src = read_source(file)?;
    let name = file.display().to_string();
    let global = global_context(search_paths(include));
    tracing::debug!(file = %name, search_paths = ?global.search_paths(), "running entry module");

    match global.run_module(&name, &src) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprint!("{}", render_error(&e, &global));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_parse(file: &Path, format: Format) -> Result<ExitCode> {
    let src = read_source(file)?;
    let name = file.display().to_string();

    let program = match parse_str(&name, &src) {
        Ok(program) => program,
        Err(e) => {
            let sources = SingleSource {
                file: &name,
                source: &src,
            };
            eprint!("{}", render_error(&RuntimeError::from(e), &sources));
            return Ok(ExitCode::FAILURE);
        }
    };

    match format {
        Format::Pretty => println!("{}", program.debug()),
        Format::Json => {
            let output = ParseOutput {
                file: &name,
                program: &program,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}
