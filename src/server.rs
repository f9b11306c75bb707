use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::routes::create_routes;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Connects, migrates, and serves the HTTP API until ctrl-c.
pub async fn serve(config: Config) -> Result<(), ServerError> {
    let db = connect(&config).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied");

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let port = config.port;
    let app = create_routes(AppState::new(db, config));

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
