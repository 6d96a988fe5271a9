mod config;
mod server;

use clap::{Parser, Subcommand};
use crate::config::Config;
use crate::server::{ServerState, run_server};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(about = "Item catalog with deduplicated image storage")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Server {
        /// Path to configuration file; defaults and BAZAAR_* variables apply without one
        #[arg(short, long)]
        config: Option<String>,

        /// Prepare the database schema and image directory, then exit
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_core=info,bazaar_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { config, init } => {
            tracing::info!(
                "Starting Bazaar server with config: {}",
                config.as_deref().unwrap_or("<defaults>")
            );

            let cfg = match Config::load(config.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Failed to load config: {}", e);
                    std::process::exit(1);
                }
            };

            tracing::info!(
                "Database: {}, Images: {}, Bind: {}",
                cfg.storage.db_path.display(),
                cfg.storage.image_dir.display(),
                cfg.server.bind_addr
            );

            if init {
                if let Err(e) = ServerState::new(&cfg) {
                    tracing::error!("Initialization failed: {}", e);
                    std::process::exit(1);
                }
                tracing::info!("Initialization completed (init-only mode)");
                return;
            }

            if let Err(e) = run_server(cfg).await {
                tracing::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
