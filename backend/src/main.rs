use std::sync::Arc;

use log::{error, info};

mod admin;
mod auth;
mod catalog;
mod config;
mod db;
mod error;
mod gallery;
mod models;
mod property;
mod routes;
mod schema;
mod state;
mod storage;

#[cfg(test)]
mod test_utils;

use db::PgPropertyRepo;
use state::AppState;
use storage::SupabaseStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = config::AppConfig::load()?;
    info!(
        "Loaded config for bucket {} at {}",
        config.storage_bucket,
        config.supabase_url()
    );

    let pool = db::create_pool(&config.database_url)?;
    let repo = PgPropertyRepo::new(pool);
    match repo.ping().await {
        Ok(result) => info!("Database test query result: {}", result),
        Err(e) => error!("Database test query failed: {}", e),
    }

    let storage = SupabaseStorage::new(&config);
    let addr = format!("{}:{}", config.bind_address, config.port);
    let state = AppState::new(config, Arc::new(repo), Arc::new(storage));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting server on {}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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
