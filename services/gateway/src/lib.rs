//! Gateway service
//!
//! axum front door for the risk calculator: the calculation endpoint plus
//! accounts, saved trades, market prices and dashboard statistics.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod router;
pub mod state;
pub mod store;

use anyhow::Context;
use market_data::{HttpPriceProvider, InMemoryPriceProvider, PriceProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub use config::GatewayConfig;
pub use router::create_router;
pub use state::AppState;

use auth::Role;
use store::StoreError;
use store::users::{User, hash_password};

/// Pick the price source from the config.
pub async fn build_price_provider(
    config: &GatewayConfig,
) -> anyhow::Result<Arc<dyn PriceProvider>> {
    if let Some(url) = &config.price_feed_url {
        tracing::info!(%url, "Using upstream price feed");
        return Ok(Arc::new(HttpPriceProvider::new(url.as_str())?));
    }

    match &config.quotes_file {
        Some(path) => Ok(Arc::new(
            InMemoryPriceProvider::load_json(path)
                .await
                .with_context(|| format!("loading quotes from {}", path.display()))?,
        )),
        None => {
            tracing::warn!("No price feed or quotes file configured; price lookups will be empty");
            Ok(Arc::new(InMemoryPriceProvider::new()))
        }
    }
}

/// Create the configured admin account if it does not exist yet.
pub async fn seed_admin(state: &AppState, config: &GatewayConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let admin = User::new(
        email,
        Some("Administrator".to_string()),
        Role::Admin,
        hash_password(password)?,
    );
    match state.users.insert(admin).await {
        Ok(()) => tracing::info!(%email, "Seeded admin account"),
        Err(StoreError::Duplicate(_)) => tracing::debug!(%email, "Admin account already present"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn build_state(config: &GatewayConfig) -> anyhow::Result<AppState> {
    let prices = build_price_provider(config).await?;
    let state = AppState::new(config, prices);
    seed_admin(&state, config).await?;
    Ok(state)
}

/// Bind, serve until Ctrl-C.
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let sweeper =
        rate_limit::spawn_sweeper(state.rate_limiter.clone(), config.rate_limit_sweep_interval());

    let app = create_router(state);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
