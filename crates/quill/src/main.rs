//! Quill CLI - static blog renderer.
//!
//! Provides commands for:
//! - `render`: Render markdown posts to HTML fragments
//! - `toc`: Print the table of contents of a post
//! - `timeline`: Render a timeline data file
//! - `posts`: List posts and tags in the content directory
//! - `pages`: List standalone pages

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PagesArgs, PostsArgs, RenderArgs, TimelineArgs, TocArgs};
use output::Output;

/// Quill - static blog renderer.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Enable verbose output (per-file progress and fallback logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown posts to HTML.
    Render(RenderArgs),
    /// Print the table of contents of a post.
    Toc(TocArgs),
    /// Render a timeline from a TOML data file.
    Timeline(TimelineArgs),
    /// List posts in the content directory.
    Posts(PostsArgs),
    /// List standalone pages in the content directory.
    Pages(PagesArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Toc(args) => args.execute(),
        Commands::Timeline(args) => args.execute(),
        Commands::Posts(args) => args.execute(),
        Commands::Pages(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
