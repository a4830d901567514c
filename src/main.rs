use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::net::TcpListener;

use greensearch::config::Config;
use greensearch::logging;
use greensearch::nlp::{NlpClient, SemanticBackend};
use greensearch::resolver::SearchResolver;
use greensearch::server::{self, AppState};
use greensearch::store::postgres::PostgresProductStore;
use greensearch::store::ProductStore;

#[derive(Parser)]
#[command(
    name = "greensearch",
    version,
    about = "Search resolver service for an eco-rated product catalog"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Skip automatic database migration on startup
    #[arg(long)]
    skip_migrate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations and exit
    Migrate,
    /// Probe the external NLP collaborator's health endpoint and exit
    NlpHealth,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args
    let cli = Cli::parse();

    // 2. Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error (using defaults): {}", e);
        Config::default()
    });

    // 3. Initialize logging before any other output
    logging::init_logging(&config);

    match cli.command {
        Some(Commands::Migrate) => {
            tracing::info!("Running database migrations...");
            let _store = PostgresProductStore::new(&config.database_url, true)
                .await
                .expect("Failed to connect and run migrations");
            println!("Migrations completed successfully.");
            return Ok(());
        }

        Some(Commands::NlpHealth) => {
            let client = NlpClient::new(
                config.nlp.base_url.clone(),
                config.nlp.search_timeout_ms,
                config.nlp.health_timeout_ms,
            );
            if client.health().await {
                println!("NLP service at {} is healthy.", config.nlp.base_url);
            } else {
                println!("NLP service at {} is unreachable.", config.nlp.base_url);
            }
            return Ok(());
        }

        None => {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                "greensearch server starting"
            );

            // 4. Initialize the PostgreSQL catalog store
            let run_migrations = !cli.skip_migrate;
            let store = Arc::new(
                PostgresProductStore::new(&config.database_url, run_migrations)
                    .await
                    .expect("Failed to initialize database"),
            );

            tracing::info!(database_url = %config.database_url, "PostgreSQL store initialized");

            // 5. Create the NLP client unless the semantic stage is disabled
            let nlp: Option<Arc<dyn SemanticBackend>> = if config.nlp.enabled {
                tracing::info!(base_url = %config.nlp.base_url, "Semantic search stage enabled");
                Some(Arc::new(NlpClient::new(
                    config.nlp.base_url.clone(),
                    config.nlp.search_timeout_ms,
                    config.nlp.health_timeout_ms,
                )))
            } else {
                tracing::info!("Semantic stage disabled via config (nlp.enabled=false)");
                None
            };

            // 6. Wire the resolver and serve
            let resolver = Arc::new(SearchResolver::new(
                store.clone() as Arc<dyn ProductStore>,
                nlp.clone(),
                config.search.clone(),
            ));

            let state = AppState {
                resolver,
                store: store as Arc<dyn ProductStore>,
                nlp,
            };

            let app = server::router(state);
            let listener = TcpListener::bind(&config.http_bind).await?;
            tracing::info!(addr = %config.http_bind, "HTTP server listening");

            axum::serve(listener, app).await?;

            tracing::info!("greensearch server stopped");
        }
    }

    Ok(())
}
