//! Todos command-line binary.

use std::path::PathBuf;

use clap::Parser;
use todo_store::{connect_store, shared_session, BackendKind, SessionData, StoreConfig};
use todos::{init_tracing, run, Command};

#[derive(Parser)]
#[command(name = "todos")]
#[command(about = "Manage todo lists in PostgreSQL, SQLite or a session file")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Session file used by the session backend
    #[arg(long, global = true, default_value = "todos-session.json")]
    session_file: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = StoreConfig::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        backend = config.backend.as_str(),
        production = config.production,
        "Starting todos"
    );

    let session_data = if config.backend == BackendKind::Session {
        SessionData::load(&cli.session_file)?
    } else {
        SessionData::new()
    };
    let session = shared_session(session_data);

    let store = connect_store(&config, session.clone()).await?;
    let result = run(store.as_ref(), cli.command).await;
    store.close().await;
    let output = result?;

    if config.backend == BackendKind::Session {
        let data = session
            .read()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {e}"))?
            .clone();
        data.save(&cli.session_file)?;
    }

    if cli.json {
        println!("{}", output.to_json()?);
    } else {
        print!("{output}");
    }

    Ok(())
}
