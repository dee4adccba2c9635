//! Trailmarks CLI - serve, seed and inspect the trail stone catalog

use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trailmarks::{QueryService, SeedMode, SeedOutcome, StoreConfig, StoreHandle, ui};

#[derive(Parser)]
#[command(name = "trailmarks")]
#[command(version)]
#[command(about = "Trail stone catalog - browse Wandersteine over HTTP")]
#[command(long_about = r#"
Trailmarks serves a read-only catalog of Wandersteine (trail stones).

The database is picked from the environment:
  USE_SQLITE=true or no DB_HOST   embedded SQLite file (SQLITE_PATH, default trailmarks.db)
  DB_HOST=...                     PostgreSQL (DB_USER, DB_PASSWORD, DB_NAME, DB_PORT, DB_SSLMODE)

Example usage:
  trailmarks serve --port 8080
  trailmarks list --recent 5
  DB_HOST=db.internal trailmarks seed
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the store, seed sample data and serve the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Skip sample-data seeding
        #[arg(long)]
        no_seed: bool,
    },

    /// Seed sample data into an empty store
    Seed {
        /// Insert one stone at a time instead of in a single transaction
        #[arg(long)]
        sequential: bool,
    },

    /// Print stones, most recent first
    List {
        /// Only the N most recent stones
        #[arg(short, long, num_args = 0..=1, default_missing_value = "5")]
        recent: Option<usize>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one stone by its unique id
    Show {
        /// Unique id, e.g. WS-2024-001
        unique_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = StoreConfig::from_env()?;
    let handle = open_store(&config).await?;

    let result = run(cli.command, handle.clone()).await;
    handle.close().await;
    result
}

async fn run(command: Commands, handle: StoreHandle) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Serve { port, bind, no_seed } => {
            if !no_seed {
                match trailmarks::seed(&handle, SeedMode::Atomic).await {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => return Err(e.into()),
                    // Seeding problems never keep the API from coming up
                    Err(e) => tracing::warn!("Failed to seed database: {}", e),
                }
            }

            let backend = handle.kind();
            let queries = QueryService::new(handle);
            trailmarks::server::start_server(SocketAddr::new(bind, port), queries, backend).await?;
        }

        Commands::Seed { sequential } => {
            let mode = if sequential { SeedMode::Sequential } else { SeedMode::Atomic };
            match trailmarks::seed(&handle, mode).await? {
                SeedOutcome::Inserted(n) => ui::success(&format!("Seeded {} sample stones", n)),
                SeedOutcome::AlreadySeeded { existing } => {
                    ui::info("Already seeded", &format!("{} stones present, nothing written", existing))
                }
            }
        }

        Commands::List { recent, json } => {
            let queries = QueryService::new(handle);
            let stones = match recent {
                Some(limit) => queries.list_recent(limit).await?,
                None => queries.list_all().await?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&stones)?);
            } else if stones.is_empty() {
                ui::empty("No stones found.");
            } else {
                let title = match recent {
                    Some(limit) => format!("{} most recent stones", limit.min(stones.len())),
                    None => format!("{} stones", stones.len()),
                };
                ui::header(&title);
                println!("{}", ui::stones_table(&stones));
            }
        }

        Commands::Show { unique_id } => {
            let queries = QueryService::new(handle);
            match queries.find_by_unique_id(&unique_id).await? {
                Some(stone) => println!("{}", serde_json::to_string_pretty(&stone)?),
                None => {
                    ui::error(&format!("No stone with unique id '{}'", unique_id));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn open_store(config: &StoreConfig) -> anyhow::Result<StoreHandle> {
    match trailmarks::initialize(config).await {
        Ok(handle) => Ok(handle),
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            Err(e.into())
        }
    }
}
