use colleko_server::core::Config;
use colleko_server::monitoring::{MonitorConfig, start_runtime_monitoring};
use colleko_server::{AppState, create_router};
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Carica la configurazione da .env / ambiente
    let config = Config::from_env()?;
    config.print_info();

    // Pool di connessioni MySQL condiviso da tutti i repository
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect(&config.database_url)
        .await?;

    let state = Arc::new(AppState::from_config(pool, &config));

    // Monitor di runtime in background (CPU/memoria + gauge di dominio)
    tokio::spawn(start_runtime_monitoring(
        state.clone(),
        MonitorConfig::default(),
    ));

    let app = create_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Server listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
