use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use clap::Parser;
use server::{cli::Cli, db, routes, serve::serve, store::SqliteWorkoutStore, AppState};
use shared::*;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    load_dotenv()?;
    configure_tracing();

    let args = Cli::parse();
    debug!(?args);

    // Never serve against an out of date schema
    let ran = db::run_migrations(&args.sqlite_connection_string)?;
    info!("Ran {ran} db migrations");

    let pool = db::create_pool(
        &args.sqlite_connection_string,
        args.pool_max_size,
        args.pool_timeout(),
    )?;
    // Fail fast if the database can't be reached
    drop(pool.get().await?);

    let state = AppState::new(SqliteWorkoutStore::new(pool));
    let app = routes::app(state, args.read_timeout(), args.write_timeout());

    let socket = SocketAddr::new(IpAddr::from_str(&args.bind_addr)?, args.port);

    let listener = TcpListener::bind(socket).await?;
    info!("listening on {}", listener.local_addr()?);

    serve(listener, app, args.idle_timeout(), shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Unable to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Unable to install SIGTERM handler");
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

    info!("Shutdown signal received");
}
