use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::lifecycle::SessionInitializer;
use crate::metadata::FileVersionFetcher;
use crate::persistence::{PgSessionRepository, SessionRepository};
use crate::runtime::{Context as TurnContext, FrameKind, SessionState, TraceEvent};
use crate::types::TurnRequest;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Parley - session lifecycle for stack-based dialogue flows", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL (overrides config file and env vars)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize one turn offline against a session state file
    Turn {
        /// Request JSON (a TurnRequest, or a platform envelope with --envelope)
        #[arg(short = 'r', long = "request")]
        request: PathBuf,

        /// Treat the request file as a platform request envelope
        #[arg(long)]
        envelope: bool,

        /// Version metadata JSON (overrides metadata.version_path)
        #[arg(short = 'v', long = "version")]
        version: Option<PathBuf>,

        /// Session state JSON; read if present and rewritten after the turn
        #[arg(short = 's', long = "state")]
        state: Option<PathBuf>,
    },

    /// Run database migrations
    Migrate,

    /// Print the persisted session state of a user
    Show {
        /// User ID
        user_id: String,
    },

    /// Delete the persisted session state of a user
    Reset {
        /// User ID
        user_id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

/// Run the CLI with provided arguments
pub async fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    let version_override = match &cli.command {
        Commands::Turn { version, .. } => version.clone(),
        _ => None,
    };

    // Load and validate configuration before executing any command
    let config = Config::builder()
        .config_path(cli.config)
        .database_url(cli.database_url)
        .version_path(version_override)
        .build()?;

    crate::logging::init(&config.log.filter);

    match cli.command {
        Commands::Turn {
            request,
            envelope,
            state,
            ..
        } => {
            run_turn(&config, &request, envelope, state.as_deref()).await?;
        }

        Commands::Migrate => {
            let pool = crate::db::create_pool(&config.database).await?;
            println!("Running migrations...");
            crate::db::migrate(&pool).await?;
            println!("✓ Migrations complete");
        }

        Commands::Show { user_id } => {
            let repository = pg_repository(&config).await?;
            match repository.load(&user_id).await? {
                Some(state) => {
                    if let Some(updated_at) = repository.updated_at(&user_id).await? {
                        println!("Updated: {}", updated_at);
                    }
                    println!("{}", serde_json::to_string_pretty(&state)?);
                }
                None => {
                    eprintln!("No session state for user {}", user_id);
                    std::process::exit(1);
                }
            }
        }

        Commands::Reset { user_id, yes } => {
            if !yes {
                eprintln!("Error: Confirmation required. Use --yes flag to confirm reset.");
                std::process::exit(1);
            }

            let repository = pg_repository(&config).await?;
            if repository.delete(&user_id).await? {
                println!("✓ Session state for {} deleted", user_id);
            } else {
                println!("No session state for user {}", user_id);
            }
        }

        Commands::Config => {
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to render configuration")?
            );
        }
    }

    Ok(())
}

async fn pg_repository(config: &Config) -> Result<PgSessionRepository> {
    let pool = crate::db::create_pool(&config.database).await?;
    Ok(PgSessionRepository::new(pool))
}

async fn run_turn(
    config: &Config,
    request_path: &Path,
    envelope: bool,
    state_path: Option<&Path>,
) -> Result<()> {
    let raw = tokio::fs::read_to_string(request_path)
        .await
        .with_context(|| format!("Failed to read request {}", request_path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&raw).context("Request is not valid JSON")?;
    let request = if envelope {
        TurnRequest::from_envelope(&json).context("Invalid request envelope")?
    } else {
        serde_json::from_value(json).context("Invalid turn request")?
    };

    let version_path = config
        .metadata
        .version_path
        .clone()
        .context("No version metadata given (use --version or metadata.version_path)")?;
    let fetcher = FileVersionFetcher::new(version_path);

    let state: SessionState = match state_path {
        Some(path) if tokio::fs::try_exists(path).await.unwrap_or(false) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read state {}", path.display()))?;
            serde_json::from_str(&raw).context("Invalid session state")?
        }
        _ => SessionState::default(),
    };

    let mut context = TurnContext::from_state(state);
    let branch = SessionInitializer::new(config.platform.clone())
        .initialize(&fetcher, &mut context, &request)
        .await?;

    println!("Turn: {}", context.turn.id);
    println!("Branch: {}", branch);
    println!("New stack: {}", context.turn.new_stack);

    println!("\nStack (bottom first):");
    for (index, frame) in context.stack.frames().iter().enumerate() {
        match &frame.kind {
            FrameKind::Flow => println!("  {}. {}", index, frame.diagram_id()),
            FrameKind::Resume { target, follow } => println!(
                "  {}. {} (resume: {}, follow: {:?})",
                index,
                frame.diagram_id(),
                target,
                follow
            ),
        }
    }

    if !context.trace.is_empty() {
        println!("\nTrace:");
        for event in context.trace.events() {
            match event {
                TraceEvent::Speak { message } => println!("  speak: {:?}", message),
            }
        }
    }

    if let Some(path) = state_path {
        let state = context.into_state();
        tokio::fs::write(path, serde_json::to_string_pretty(&state)?)
            .await
            .with_context(|| format!("Failed to write state {}", path.display()))?;
        println!("\n✓ State written to {}", path.display());
    }

    Ok(())
}
