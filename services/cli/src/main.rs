//! tableau - administer the users of a Tableau site from the command line
//!
//! Connection settings are read from a `.local` file in the config
//! directory, from the environment and from the global flags, in increasing
//! order of precedence.
//!
//! Exit codes: `0` on success, `1` when the command failed, `2` when there was
//! nothing to do (missing user, user already exists).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::Outcome;
use config::{AppConfig, DEFAULT_LOG_LEVEL, Overrides};

/// Tableau user administration
#[derive(Parser, Debug)]
#[command(name = "tableau")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the REST API, e.g. https://tableau.example.com/api/3.19
    #[arg(long, global = true)]
    url: Option<String>,

    /// Username used to sign in
    #[arg(long = "username", global = true)]
    api_username: Option<String>,

    /// Password used to sign in
    #[arg(long, global = true)]
    password: Option<String>,

    /// Content URL of the site, the default site when empty
    #[arg(long, global = true)]
    site: Option<String>,

    /// Directory holding the `.local` configuration file
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and print the site id and the token
    Login,

    /// Print users
    Get(commands::get::GetArgs),

    /// Create users
    Create(commands::create::CreateArgs),

    /// Update existing users
    Update(commands::update::UpdateArgs),

    /// Delete users
    Delete(commands::delete::DeleteArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = Overrides {
        url: cli.url,
        username: cli.api_username,
        password: cli.password,
        site: cli.site,
        log_level: cli.log_level,
    };
    let config = match AppConfig::load(&cli.config_dir, overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    match run(cli.command, &config).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> Result<Outcome> {
    match command {
        Commands::Login => commands::login::execute(config).await,
        Commands::Get(args) => commands::get::execute(args, config).await,
        Commands::Create(args) => commands::create::execute(args, config).await,
        Commands::Update(args) => commands::update::execute(args, config).await,
        Commands::Delete(args) => commands::delete::execute(args, config).await,
    }
}

/// Log to stderr at the configured level; `RUST_LOG` directives are honoured on top
fn init_tracing(config: &AppConfig) {
    let (level, rejected) = match config.log_level() {
        Ok(level) => (level, None),
        Err(raw) => (DEFAULT_LOG_LEVEL, Some(raw)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(raw) = rejected {
        warn!(
            "Failed to parse log level {:?} from config, using {}",
            raw, DEFAULT_LOG_LEVEL
        );
    }
    debug!("Log level set to {}", level);
}
