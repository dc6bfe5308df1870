//! burndown-sync - Jira to burndown-chart synchronization
//!
//! Main entry point for the burndown-sync CLI.

use anyhow::{bail, Context};
use burndown_sync::config::{validate_config, validate_config_result, BurndownConfig};
use burndown_sync::model::Sprint;
use burndown_sync::sync::SprintSyncWorker;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// burndown-sync - Sync Jira sprint versions into burndown day buckets
#[derive(Parser, Debug)]
#[command(name = "burndown-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/burndown/config.yaml)
    #[arg(short, long, env = "BURNDOWN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a sample configuration file
    Init,

    /// Check the configuration for problems
    Validate,

    /// Sync a sprint from Jira
    Sync {
        /// Team whose settings are used
        #[arg(short, long)]
        team: String,

        /// Sprint JSON file (id, efforts, planned)
        #[arg(short, long)]
        sprint: PathBuf,

        /// Write the updated sprint back to the file
        #[arg(short, long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = burndown_sync::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(BurndownConfig::default_path);

    match cli.command {
        Commands::Init => handle_init(&config_path),
        Commands::Validate => handle_validate(&config_path),
        Commands::Sync {
            team,
            sprint,
            write,
        } => handle_sync(&config_path, &team, &sprint, write).await,
    }
}

fn handle_init(config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() {
        bail!(
            "Config file already exists: {}\nEdit it directly or remove it first.",
            config_path.display()
        );
    }

    BurndownConfig::sample().save(config_path)?;
    println!("Created {}", config_path.display());
    println!("Edit the Jira URL, credentials and teams before running 'burndown-sync sync'.");
    Ok(())
}

fn handle_validate(config_path: &Path) -> anyhow::Result<()> {
    let config = BurndownConfig::load(config_path)?;

    match validate_config(&config) {
        Ok(()) => {
            println!("Configuration is valid ({} teams)", config.teams.len());
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                println!("  {}", error);
            }
            bail!("{} configuration problem(s) found", errors.len())
        }
    }
}

async fn handle_sync(config_path: &Path, team_name: &str, sprint_path: &Path, write: bool) -> anyhow::Result<()> {
    let config = BurndownConfig::load(config_path)?;
    validate_config_result(&config)?;

    let team = config
        .team(team_name)
        .with_context(|| format!("Unknown team '{}'", team_name))?;

    let content = fs::read_to_string(sprint_path)
        .with_context(|| format!("Failed to read sprint file {}", sprint_path.display()))?;
    let mut sprint: Sprint = serde_json::from_str(&content)
        .with_context(|| format!("Invalid sprint file {}", sprint_path.display()))?;

    tracing::info!(team = %team.name, sprint = %sprint.id, "Starting sprint sync");

    let worker = SprintSyncWorker::connect(&config.jira)?;
    let report = worker.sync_sprint(team, &mut sprint).await?;

    if write {
        fs::write(sprint_path, serde_json::to_string_pretty(&sprint)?)?;
        tracing::info!(path = %sprint_path.display(), "Sprint written");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
