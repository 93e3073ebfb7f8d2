//! Foodgram CLI - database migrations, fixture loading and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! foodgram migrate
//!
//! # Load tags (CSV rows: name,color,slug)
//! foodgram seed tags data/tags.csv
//!
//! # Load ingredients (JSON array of {name, measurement_unit})
//! foodgram seed ingredients data/ingredients.json
//!
//! # Create a user
//! foodgram user create -e cook@example.com -u cook --first-name Ann --last-name Cook -p secret123
//!
//! # Delete a user with their recipes, memberships, follows and token
//! foodgram user delete -e cook@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `FOODGRAM_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `FOODGRAM_MEDIA_ROOT` - Image directory, used when deleting users

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "foodgram")]
#[command(author, version, about = "Foodgram CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load tags from a CSV file with `name,color,slug` rows
    Tags {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Load ingredients from a JSON array of `{name, measurement_unit}`
    Ingredients {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Username
        #[arg(short, long)]
        username: String,

        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Delete a user and everything they own
    Delete {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

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
            SeedTarget::Tags { file } => commands::seed::tags(&file).await?,
            SeedTarget::Ingredients { file } => commands::seed::ingredients(&file).await?,
        },
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                username,
                first_name,
                last_name,
                password,
            } => {
                commands::user::create(commands::user::NewAccount {
                    email,
                    username,
                    first_name,
                    last_name,
                    password,
                })
                .await?;
            }
            UserAction::Delete { email } => commands::user::delete(&email).await?,
        },
    }
    Ok(())
}
