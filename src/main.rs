use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use fxrates::core::log::init_logging;
use fxrates::core::model::EntityRef;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Entity {
    Bank,
    Currency,
    Record,
}

impl Entity {
    fn with_id(self, id: u64) -> EntityRef {
        match self {
            Entity::Bank => EntityRef::Bank(id),
            Entity::Currency => EntityRef::Currency(id),
            Entity::Record => EntityRef::Record(id),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Load the configured banks and currencies
    Seed,
    /// Scrape the current rates of a bank and store them
    Scrape {
        /// Bank name, as stored in the database
        bank: String,
    },
    /// Display the latest rates of every bank
    Rates {
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Display the scrape run history
    Logs {
        /// Only show runs of this bank
        #[arg(long)]
        bank: Option<String>,
    },
    /// Hide a bank, currency or record
    Remove { entity: Entity, id: u64 },
    /// Bring back a hidden bank, currency or record
    Restore { entity: Entity, id: u64 },
}

impl From<Commands> for fxrates::AppCommand {
    fn from(cmd: Commands) -> fxrates::AppCommand {
        match cmd {
            Commands::Seed => fxrates::AppCommand::Seed,
            Commands::Scrape { bank } => fxrates::AppCommand::Scrape { bank },
            Commands::Rates { json } => fxrates::AppCommand::Rates { json },
            Commands::Logs { bank } => fxrates::AppCommand::Logs { bank },
            Commands::Remove { entity, id } => fxrates::AppCommand::Remove(entity.with_id(id)),
            Commands::Restore { entity, id } => fxrates::AppCommand::Restore(entity.with_id(id)),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fxrates::cli::setup::setup_at_path(path),
            None => fxrates::cli::setup::setup(),
        },
        Some(cmd) => fxrates::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
