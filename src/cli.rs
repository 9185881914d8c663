use std::collections::BTreeSet;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::load_config;
use crate::layout::compute_layout;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::model::{Pipeline, Todo};

#[derive(Parser, Debug)]
#[command(
    name = "tfl",
    version,
    about = "Task pipeline flow layout - computes renderable diagrams from pipeline documents"
)]
pub struct Args {
    /// Pipeline document (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Pending-approval todos JSON file (array of todos)
    #[arg(long = "todos")]
    pub todos: Option<PathBuf>,

    /// Sub-process id to expand; repeatable
    #[arg(short = 'x', long = "expand")]
    pub expand: Vec<String>,

    /// Layout config JSON overrides
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Output file for the layout dump; stdout if omitted
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init()
        .ok();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let raw = read_input(args.input.as_deref())?;
    let pipeline: Pipeline =
        serde_json::from_str(&raw).context("failed to parse pipeline document")?;

    let todos: Vec<Todo> = match &args.todos {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw).context("failed to parse todos")?
        }
        None => Vec::new(),
    };

    let expanded: BTreeSet<String> = args.expand.into_iter().collect();
    let layout = compute_layout(&pipeline, &todos, &expanded, &config)?;

    match &args.output {
        Some(path) => write_layout_dump(path, &layout)?,
        None => {
            let dump = LayoutDump::from_layout(&layout);
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        None => anyhow::bail!("no input given; pass --input <file> or --input -"),
        Some(path) if path.as_os_str() == "-" => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
    }
}
