use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    leadline_common::now_ms,
    leadline_sessions::SessionRegistry,
    leadline_store::{KvStore, RedisStore},
};

#[derive(Parser)]
#[command(name = "leadline", about = "Leadline — chat auto-reply for moving-service inquiries")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    // Gateway arguments (used when no subcommand is provided, or with `gateway`)
    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the api server and message loop (default when no subcommand is provided).
    Gateway,
    /// Session management.
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// List live inquiry sessions.
    List,
    /// Delete every live session record and claim. Markers stay.
    Purge {
        /// Report how many records would be deleted without deleting them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "leadline starting");

    match cli.command {
        // Default: run the service when no subcommand is provided.
        None | Some(Commands::Gateway) => {
            let mut config = leadline_config::discover_and_load();

            // CLI args override config values.
            if let Some(bind) = cli.bind {
                config.server.bind = bind;
            }
            if let Some(port) = cli.port {
                config.server.port = port;
            }

            leadline_gateway::run(config).await
        },
        Some(Commands::Sessions { action }) => handle_sessions(action).await,
    }
}

async fn handle_sessions(action: SessionAction) -> anyhow::Result<()> {
    let config = leadline_config::discover_and_load();
    let store: Arc<dyn KvStore> = Arc::new(RedisStore::connect(&config.store.url).await?);
    let registry = SessionRegistry::new(store, &config.matching.country_code);

    match action {
        SessionAction::List => {
            let sessions = registry.list_sessions().await?;
            if sessions.is_empty() {
                println!("No live sessions.");
            } else {
                let now = now_ms();
                for session in &sessions {
                    println!(
                        "  {}  {:?}  company {}  age {}m  claimed by {}",
                        session.session_id,
                        session.status,
                        session.company_id,
                        session.age_minutes(now),
                        session.claimed_by.as_deref().unwrap_or("-"),
                    );
                }
            }
        },
        SessionAction::Purge { dry_run } => {
            if dry_run {
                let count = registry.count_purgeable().await?;
                println!("Would purge {count} session record(s).");
            } else {
                let count = registry.purge_sessions().await?;
                println!("Purged {count} session record(s).");
            }
        },
    }

    Ok(())
}
