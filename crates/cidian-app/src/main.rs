//! cidian: EN/CN vocabulary lookup in the terminal

use std::sync::Arc;

use cidian_types::LookupMode;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod controller;
mod events;
mod io;
mod profile;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use self::commands::LookupOptions;
use self::controller::AppController;
use self::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "cidian")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input language: en (analyze English) or cn (find the English word)
    #[arg(short, long, global = true, default_value = "en")]
    mode: LookupMode,

    /// Profile to load from the config directory
    #[arg(short, long, global = true, default_value = "main")]
    profile: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up one word or phrase
    Lookup {
        query: Vec<String>,

        /// Read the explanation aloud
        #[arg(long)]
        narrate: bool,

        /// Pronounce the word
        #[arg(long)]
        pronounce: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recent lookups
    History {
        #[arg(long)]
        json: bool,
    },
    /// Print dictionary links for a word
    Links { word: Vec<String> },
    /// Speak a query, then look it up
    Voice {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cidian=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to read .env: {e}");
        }
    }
    init_tracing();

    let cli = Cli::parse();
    let config = profile::load_user_profile(&cli.profile)?;
    let state = Arc::new(AppState::from_config(config)?);

    match cli.command {
        Some(Commands::Lookup {
            query,
            narrate,
            pronounce,
            json,
        }) => {
            let options = LookupOptions {
                mode: cli.mode,
                narrate,
                pronounce,
                json,
            };
            commands::lookup(&state, &query.join(" "), options).await
        }
        Some(Commands::History { json }) => commands::history(&state, json).await,
        Some(Commands::Links { word }) => commands::links(&word.join(" ")),
        Some(Commands::Voice { json }) => {
            let options = LookupOptions {
                mode: cli.mode,
                narrate: false,
                pronounce: false,
                json,
            };
            commands::voice(&state, options).await
        }
        None => run_shell(state, cli.mode).await,
    }
}

async fn run_shell(state: Arc<AppState>, mode: LookupMode) -> anyhow::Result<()> {
    let session = state.open_session(mode).await;
    let controller = AppController::new(state).await;
    let mut tasks = controller.spawn_tasks(session);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
            _ = controller.closed() => break,
            Some(result) = tasks.join_next() => match result {
                Ok(Ok(())) => tracing::debug!("Task exited"),
                Ok(Err(e)) => {
                    tracing::error!("Task failed: {e}");
                    break;
                }
                Err(e) => {
                    tracing::error!("Task panicked: {e}");
                    break;
                }
            },
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::error!("Task failed during shutdown: {e}");
        }
    }

    // A pending stdin read cannot be cancelled
    std::process::exit(0)
}
