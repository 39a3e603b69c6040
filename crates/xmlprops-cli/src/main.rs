use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use xmlprops::inspect::{find_attribute, walk};
use xmlprops::xml::to_pretty_xml;
use xmlprops::{get, load_file, save_file, set, Context, Document};

#[derive(Debug, Parser)]
#[command(
    name = "xmlprops",
    version,
    about = "Read and write deployment XML through dotted paths"
)]
struct Args {
    /// Deployment XML file
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value at a path
    Get {
        /// Dotted path, e.g. cluster.:hostcount
        path: String,
    },
    /// Write a value at a path, creating missing elements
    Set {
        path: String,
        value: String,
        /// Unique ID for a `*` predicate; repeat for several
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<String>,
        /// Output file (defaults to rewriting FILE)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Pretty-print the document
    Show {
        #[arg(long, default_value_t = 4)]
        indent: usize,
    },
    /// List every node and attribute with its path
    Walk,
    /// Print `value,"text"` for each outermost element carrying an attribute
    Find { attribute: String },
    /// Write named properties using a definitions file
    Apply {
        /// Properties file mapping property names to paths
        #[arg(short, long, value_name = "DEFINITIONS")]
        definitions: PathBuf,
        /// NAME=VALUE assignments
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<String>,
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut doc = load_file(&args.file)?;

    match args.command {
        Command::Get { path } => {
            let found = get(&doc, &path, &[])?;
            if found.is_absent() {
                bail!("no such path: {path}");
            }
            println!("{found}");
        }
        Command::Set {
            path,
            value,
            ids,
            output,
        } => {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            set(&mut doc, &path, &value, &ids)?;
            write(&doc, output.as_deref().unwrap_or(&args.file))?;
        }
        Command::Show { indent } => print!("{}", to_pretty_xml(&doc, indent)),
        Command::Walk => {
            for entry in walk(&doc.root) {
                println!("{entry}");
            }
        }
        Command::Find { attribute } => {
            for found in find_attribute(&doc.root, &attribute)? {
                println!("{found}");
            }
        }
        Command::Apply {
            definitions,
            assignments,
            ids,
            output,
        } => {
            let mut ctx = Context::new();
            ctx.load_definitions(&definitions)?;
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            for (name, value) in &assignments {
                ctx.apply(&mut doc, name, value, &ids)
                    .with_context(|| format!("cannot apply {name}"))?;
            }
            write(&doc, output.as_deref().unwrap_or(&args.file))?;
        }
    }

    Ok(())
}

fn write(doc: &Document, path: &Path) -> Result<()> {
    save_file(doc, path)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, found {raw:?}")),
    }
}
