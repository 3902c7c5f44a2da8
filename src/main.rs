#![warn(clippy::pedantic, clippy::all, clippy::nursery)]

use rollcall::{config::RuntimeConfiguration, state::RollcallState};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    if let Err(e) = dotenv {
        warn!(?e, "no .env file loaded, using the process environment");
    }

    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = RollcallState::new(PgPoolOptions::new(), &config)
        .await
        .expect("unable to create state");
    info!("Database connected successfully");

    let served = rollcall::serve(&config, state.clone(), shutdown_signal()).await;
    state.sensible_shutdown().await;

    if let Err(e) = served {
        error!(?e, "Server stopped with an error");
        std::process::exit(1);
    }
}
