use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod compose;
mod error;
mod inspect;
mod output;
mod split;
mod utils;
mod verify;

use error::Result;

#[derive(Parser)]
#[command(name = "idfile")]
#[command(about = "Identity file toolkit for bundled SSH and TLS credentials", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the contents of an identity file without the private key
    Inspect {
        #[command(flatten)]
        config: inspect::Config,
    },
    /// Bundle separate credential files into an identity file
    Compose {
        #[command(flatten)]
        config: compose::Config,
    },
    /// Check that the identity file yields usable TLS and SSH configurations
    Verify {
        #[command(flatten)]
        config: verify::Config,
    },
    /// Write each component of an identity file to its own file
    Split {
        #[command(flatten)]
        config: split::Config,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { config } => inspect::execute(config)?,
        Commands::Compose { config } => compose::execute(config)?,
        Commands::Verify { config } => verify::execute(config)?,
        Commands::Split { config } => split::execute(config)?,
    }

    Ok(())
}
