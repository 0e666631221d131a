use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use pizza_restaurant_service::{
    config::Config,
    handlers::{app, AppState},
    seed::seed,
    store::Store,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations and serve the HTTP API
    Serve {
        /// Overrides BIND_ADDRESS
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Apply pending migrations and exit
    Migrate,
    /// Replace the database contents with demo data
    Seed,
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store = Store::connect(&config.database_url, config.pool_size)?;

    match cli.command {
        Commands::Serve { bind } => {
            store.run_pending_migrations()?;
            serve(store, bind.unwrap_or(config.bind_address)).await
        }
        Commands::Migrate => {
            let applied = store.run_pending_migrations()?;
            info!(applied, database = %config.database_url, "migrations complete");
            Ok(())
        }
        Commands::Seed => {
            store.run_pending_migrations()?;
            let summary = seed(&store)?;
            info!(
                restaurants = summary.restaurants,
                pizzas = summary.pizzas,
                restaurant_pizzas = summary.restaurant_pizzas,
                "seeding complete"
            );
            Ok(())
        }
    }
}

async fn serve(store: Store, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let app = app(AppState { store });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Pizza restaurant service listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
