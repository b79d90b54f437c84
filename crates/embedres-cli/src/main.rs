//! Embedres CLI - inspect resource bundles.
//!
//! Without `--file` the queries go to the global registry, which holds every
//! bundle linked into this binary (the dock bundle). With `--file` a single
//! bundle is read from disk.

mod commands;
mod source;

use anyhow::Result;
use clap::{Parser, Subcommand};
use source::BundleSource;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "embedres")]
#[command(about = "Inspect embedded and on-disk resource bundles")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Bundle file to read instead of the linked bundles
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every resource path
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show size and flags of a resource
    Details {
        path: String,
        #[arg(long)]
        json: bool,
    },
    /// List the children of a directory
    Children { path: String },
    /// Write a resource's contents to stdout
    Extract { path: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so `extract` output stays clean
    let log_level = if args.debug { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    // The unload hook runs after the subscriber is gone; it reports on stderr.
    embedres::platform::set_hook_diagnostics(args.debug);

    let strategy = embedres::ACTIVE_STRATEGY;
    debug!(
        "Hook strategy: {} ({}), load section {:?}, unload section {:?}",
        strategy,
        embedres::platform::object_format(),
        strategy.load_section(),
        strategy.unload_section()
    );

    let source = BundleSource::open(args.file.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &args.command {
        Command::List { json } => commands::list(&source, *json, &mut out),
        Command::Details { path, json } => commands::details(&source, path, *json, &mut out),
        Command::Children { path } => commands::children(&source, path, &mut out),
        Command::Extract { path } => commands::extract(&source, path, &mut out),
    }
}
