#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::doc_markdown)]

mod commands;
mod loader;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use startup_core::{Command, Config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "startup-code")]
#[command(author, version, about = "Run a module once when your server starts", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory (project root)
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Validate the project config and show what setup registers
    Check {
        /// Path to config file (overrides auto-discovery)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Host command to simulate: dev, build, preview or sync
        #[arg(long, default_value = "build")]
        command: Command,
    },

    /// Run the startup plugin's transform over a module
    Transform {
        /// Module source file
        file: PathBuf,

        /// Module id the pipeline would see (defaults to the file path)
        #[arg(long)]
        id: Option<String>,

        /// Transform as client-side code instead of server-side
        #[arg(long)]
        client: bool,

        /// Write the source map to this file
        #[arg(long, value_name = "FILE")]
        sourcemap: Option<PathBuf>,

        /// Output file (if not specified, prints to stdout)
        #[arg(long, short = 'o')]
        outfile: Option<PathBuf>,
    },

    /// Load the startup module under a dev server and serve the dev-only route
    Dev {
        /// Path to config file (overrides auto-discovery)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Port to listen on
        #[arg(long, short = 'p', default_value = "4321")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "localhost")]
        host: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Check { config: file, command }) => {
            let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
            rt.block_on(commands::check::run(&config, file.as_deref(), command))
        }
        Some(Commands::Transform {
            file,
            id,
            client,
            sourcemap,
            outfile,
        }) => {
            let action = commands::transform::TransformAction {
                file,
                id,
                ssr: !client,
                sourcemap,
                outfile,
            };
            let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
            rt.block_on(commands::transform::run(&config, action))
        }
        Some(Commands::Dev {
            config: file,
            port,
            host,
        }) => {
            let action = commands::dev::DevAction {
                cwd: config.cwd.clone(),
                config: file,
                port,
                host,
            };
            let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
            rt.block_on(commands::dev::run(action))
        }
    }
}
