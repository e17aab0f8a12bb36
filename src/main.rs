use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lingvo_time::GameType;
use lingvo_time::app::build_controller;
use lingvo_time::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "lingvo-time")]
#[command(about = "Earn play time by solving word puzzles and arithmetic problems")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to .lingvo-time/config.toml, then ~/.lingvo-time/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the games database (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local HTTP API
    Serve {
        /// Port to listen on (overrides settings.http_port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play in the terminal
    Play {
        /// Game to play: word or arithmetic
        #[arg(short, long, default_value = "word", value_parser = parse_game_type)]
        game: GameType,

        /// Difficulty level
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=9))]
        level: u8,
    },

    /// Show recent runs, or one run's history
    Status {
        /// Run to show
        run_id: Option<String>,
    },

    /// Initialize a new config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn parse_game_type(s: &str) -> Result<GameType, String> {
    GameType::from_str(s).ok_or_else(|| format!("unknown game '{}' (word, arithmetic)", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init { force } = cli.command {
        return cli::init::init_command(cli.config, force);
    }

    let work_dir = std::env::current_dir().context("Failed to read current directory")?;
    let config = Config::resolve(cli.config.as_deref(), &work_dir)?;
    let db_path = cli.db.unwrap_or_else(|| config.db_path());

    match cli.command {
        Commands::Serve { port } => {
            cli::serve::serve_command(&config, &db_path, port)?;
        }
        Commands::Play { game, level } => {
            let controller = build_controller(&config, &db_path)?;
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stdout();
            cli::play::play_session(&controller, game, level, &mut input, &mut output)?;
        }
        Commands::Status { run_id } => {
            let controller = build_controller(&config, &db_path)?;
            cli::status::status_command(&controller, run_id)?;
        }
        Commands::Init { .. } => {}
    }

    Ok(())
}
