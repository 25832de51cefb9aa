use clap::{Parser, Subcommand};
use config::{default_config_path, default_store_path, PlenaryConfig};
use plenary::voting::VotingService;
use std::path::{Path, PathBuf};

pub mod config;
pub mod logging;
pub mod motions;
pub mod version;

#[derive(Parser)]
#[command(name = "plenary")]
#[command(author = "Plenary Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator CLI for assembly motion voting", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.local/share/plenary/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Create a motion
    Create {
        /// Motion title (at least 5 characters)
        #[arg(long)]
        title: String,

        /// Optional free-text description
        #[arg(long)]
        description: Option<String>,

        /// Print the motion as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open the voting session of a motion
    Open {
        /// Motion id
        id: String,

        /// Session length in minutes
        #[arg(long)]
        minutes: Option<u64>,

        /// Session length in hours (added to --minutes)
        #[arg(long)]
        hours: Option<u64>,

        /// Print the motion as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cast a ballot on an open motion
    Vote {
        /// Motion id
        id: String,

        /// Member identifier checked against the eligibility service
        #[arg(long)]
        member: String,

        /// yes or no
        #[arg(long)]
        ballot: String,

        /// Print the vote record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a motion, closing it if its session has ended
    Show {
        /// Motion id
        id: String,

        /// Print the motion as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the individual votes cast on a motion
    Votes {
        /// Motion id
        id: String,

        /// Print the votes as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all motions
    List {
        /// Print the motions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let output = match cli.command {
        Commands::Version => {
            version::execute();
            return Ok(());
        }
        Commands::InitConfig { force } => init_config(&config_path, force)?,
        Commands::Create {
            title,
            description,
            json,
        } => {
            let service = connect(&config_path).await?;
            motions::create(&service, &title, description, json).await?
        }
        Commands::Open {
            id,
            minutes,
            hours,
            json,
        } => {
            let service = connect(&config_path).await?;
            motions::open(&service, &id, minutes, hours, json).await?
        }
        Commands::Vote {
            id,
            member,
            ballot,
            json,
        } => {
            let service = connect(&config_path).await?;
            motions::vote(&service, &id, &member, &ballot, json).await?
        }
        Commands::Show { id, json } => {
            let service = connect(&config_path).await?;
            motions::show(&service, &id, json).await?
        }
        Commands::Votes { id, json } => {
            let service = connect(&config_path).await?;
            motions::votes(&service, &id, json).await?
        }
        Commands::List { json } => {
            let service = connect(&config_path).await?;
            motions::list(&service, json).await?
        }
    };

    println!("{}", output);
    Ok(())
}

fn init_config(config_path: &Path, force: bool) -> Result<String, Box<dyn std::error::Error>> {
    if config_path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    let store_path = default_store_path(config_path);
    PlenaryConfig::create_default(config_path, &store_path)?;
    Ok(format!(
        "Created {}\nMotions will be stored in {}",
        config_path.display(),
        store_path.display()
    ))
}

/// Load config, start logging and wire the service.
async fn connect(config_path: &Path) -> Result<VotingService, Box<dyn std::error::Error>> {
    let config = load_or_create(config_path)?;
    logging::init(&config.logging)?;
    motions::build_service(&config).await
}

/// Load the config file, generating a default one on first use.
fn load_or_create(config_path: &Path) -> Result<PlenaryConfig, Box<dyn std::error::Error>> {
    if !config_path.exists() {
        eprintln!(
            "No config file found. Creating default configuration at {}",
            config_path.display()
        );
        PlenaryConfig::create_default(config_path, &default_store_path(config_path))?;
    }
    PlenaryConfig::load(config_path)
}
