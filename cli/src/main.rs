//! # carchive Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `carchive` CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the subcommand handlers
//!
//! ## Examples
//!
//! ```bash
//! # Pack a directory as a gzip-compressed tarball
//! carchive create ./my-comp -f tgz
//!
//! # Unpack it again into the directory layout, with debug logging
//! carchive -vv convert my-comp-1.0.0.tgz -f fs -o ./unpacked
//!
//! # Show what is inside
//! carchive inspect ./unpacked
//! ```
//!
//! Any error is printed with its full cause chain and the process exits with
//! status 1.
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "carchive",
    about = "Create, convert and inspect component archives",
    long_about = "Serializes component archives (a component descriptor plus its local blobs)\n\
                  to a directory (fs), a tar file (tar) or a gzip-compressed tar file (tgz).",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Build an archive from a directory containing component-descriptor.yaml.
    Create(commands::create::CreateArgs),
    /// Re-encode an existing archive in another format.
    Convert(commands::convert::ConvertArgs),
    /// Print the contents of an archive.
    Inspect(commands::inspect::InspectArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Create(args) => commands::create::handle_create(args),
        Commands::Convert(args) => commands::convert::handle_convert(args),
        Commands::Inspect(args) => commands::inspect::handle_inspect(args),
    };

    if let Err(e) = command_result {
        tracing::debug!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
