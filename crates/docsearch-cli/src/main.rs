//! docsearch - inspect, check and query documentation search indexes.
//!
//! Subcommands work on the `search_index.js` file a documentation build
//! produces. `serve` exposes the same operations as a JSON-RPC 2.0 service.

mod commands;
mod handler;
mod server;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use docsearch_core::config::{SearchConfig, ServerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "docsearch")]
#[command(about = "Inspect, check and query documentation search indexes")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an index and check that it re-serializes unchanged
    Check(CheckArgs),
    /// Print entry counts per category and page
    Stats(StatsArgs),
    /// Rewrite an index in the generator's canonical layout
    Fmt(FmtArgs),
    /// Run a full-text query against an index
    Search(SearchArgs),
    /// Persist an index into a SQLite database
    Build(BuildArgs),
    /// Serve an index over JSON-RPC
    Serve(ServeArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CheckArgs {
    /// Path to search_index.js
    pub file: PathBuf,

    /// Fail on warnings as well as errors
    #[arg(long)]
    pub strict: bool,

    /// Do not warn about unrecognised categories
    #[arg(long)]
    pub allow_unknown_categories: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct StatsArgs {
    /// Path to search_index.js
    pub file: PathBuf,

    /// Print the statistics as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct FmtArgs {
    /// Path to search_index.js
    pub file: PathBuf,

    /// Write here instead of rewriting the input in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only report whether the file is already canonical
    #[arg(long)]
    pub check: bool,

    /// Keep a .bak copy of the file being replaced
    #[arg(long)]
    pub backup: bool,
}

#[derive(ClapArgs, Debug)]
pub struct SearchArgs {
    /// Path to search_index.js
    pub file: PathBuf,

    /// Query terms
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Restrict to a category (repeatable)
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Restrict to a page title (repeatable)
    #[arg(short, long = "page")]
    pub pages: Vec<String>,

    /// Maximum number of hits
    #[arg(short, long, default_value_t = SearchConfig::DEFAULT_LIMIT)]
    pub limit: usize,

    /// Number of hits to skip
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct BuildArgs {
    /// Path to search_index.js
    pub file: PathBuf,

    /// SQLite database to create or replace the content of
    #[arg(long)]
    pub db: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    /// Path to search_index.js
    pub file: PathBuf,

    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value_t = ServerConfig::DEFAULT_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = ServerConfig::DEFAULT_HOST)]
    pub host: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries command output.
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Check(args) => commands::check(&args),
        Command::Stats(args) => commands::stats(&args),
        Command::Fmt(args) => commands::fmt(&args),
        Command::Search(args) => commands::search(&args),
        Command::Build(args) => commands::build(&args),
        Command::Serve(args) => serve(args),
    }
}

#[tokio::main]
async fn serve(args: ServeArgs) -> Result<ExitCode> {
    let state = server::AppState::load(&args.file)?;

    let addr = server::start_server(state, &args.host, args.port).await?;

    // Print port for callers to read (intentional stdout for IPC)
    println!("RPC_PORT={}", addr.port());

    tracing::info!("RPC server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, exiting");

    Ok(ExitCode::SUCCESS)
}
