use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use venturescope::{AgentInvoker, AppState, Config, ConfigLoader, Database, create_provider};

#[derive(Parser)]
#[command(name = "venturescope")]
#[command(
    version,
    about = "AI-powered startup idea validation with a multi-agent investor report pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the validation API server
    Serve {
        #[arg(long, help = "Address to bind, e.g. 127.0.0.1:8787")]
        addr: Option<String>,
        #[arg(long, help = "SQLite database path")]
        db: Option<PathBuf>,
        #[arg(long, help = "LLM provider (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show,
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_with_file(path)?,
        None => ConfigLoader::load()?,
    };

    match cli.command {
        Commands::Serve {
            addr,
            db,
            provider,
            model,
        } => {
            let config = apply_overrides(config, addr, db, provider, model);
            config.validate()?;
            serve(config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        },
    }

    Ok(())
}

fn apply_overrides(
    mut config: Config,
    addr: Option<String>,
    db: Option<PathBuf>,
    provider: Option<String>,
    model: Option<String>,
) -> Config {
    if let Some(addr) = addr {
        config.server.bind_addr = addr;
    }
    if let Some(db) = db {
        config.storage.db_path = db;
    }
    if let Some(provider) = provider {
        config.llm.provider = provider;
    }
    if let Some(model) = model {
        config.llm.model = Some(model);
    }
    config
}

fn serve(config: Config) -> anyhow::Result<()> {
    let db = Arc::new(Database::open(&config.storage.db_path)?);
    let provider = create_provider(&config.llm)?;
    let state = AppState::new(db, AgentInvoker::new(provider));

    let rt = Runtime::new()?;
    rt.block_on(venturescope::server::serve(&config.server.bind_addr, state))?;
    Ok(())
}
