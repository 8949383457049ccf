mod api;
mod config;
mod images;
mod portal;
mod store;
mod token;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    if let Err(err) = app_main().await {
        error!(?err, "application error");
        std::process::exit(1);
    }
}

async fn app_main() -> Result<()> {
    let config = AppConfig::from_env()?;

    let api_state = api::ApiState::new(&config);
    let api_router = api::router::build_router(api_state);

    let portal_state = portal::PortalState::new(&config)?;
    let portal_router = portal::router::build_router(portal_state);

    let api_addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let portal_addr = SocketAddr::from(([0, 0, 0, 0], config.portal_port));

    let api_listener = TcpListener::bind(api_addr)
        .await
        .context("failed to bind records API listener")?;
    let portal_listener = TcpListener::bind(portal_addr)
        .await
        .context("failed to bind portal listener")?;

    info!(%api_addr, "records API listening");
    info!(%portal_addr, "portal listening");

    tokio::try_join!(
        async { axum::serve(api_listener, api_router).await.context("records API server error") },
        async { axum::serve(portal_listener, portal_router).await.context("portal server error") },
    )?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
