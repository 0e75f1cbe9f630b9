//! Oeiras CLI - database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create the document and session tables
//! oeiras-cli migrate
//!
//! # Load catalog products from a YAML file
//! oeiras-cli seed products data/products.yaml
//!
//! # Same, leaving ids that already exist untouched
//! oeiras-cli seed products data/products.yaml --skip-existing
//! ```
//!
//! Both commands read `DATABASE_URL` (and `.env` when present).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "oeiras-cli")]
#[command(author, version, about = "Oeiras CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (documents, id sequences, sessions)
    Migrate,
    /// Load records from a file
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed catalog products
    Products {
        /// YAML file with a `products` list
        file: PathBuf,

        /// Leave products whose id already exists untouched
        #[arg(long)]
        skip_existing: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products {
                file,
                skip_existing,
            } => {
                commands::seed::products(&file, skip_existing).await?;
            }
        },
    }
    Ok(())
}
