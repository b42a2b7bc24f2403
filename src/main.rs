mod app;
mod auth;
mod config;
mod error;
mod pages;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "profile_auth=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    let (host, port) = (config.host.clone(), config.port);

    let app_state = AppState::init(config).await?;
    app_state.users.create_table_if_absent().await?;

    let users = app_state.users.clone();
    let app = app::build_app(app_state);
    let served = app::serve(app, &host, port).await;

    users.close().await;
    tracing::info!("database pool closed");
    served
}
