use gatehouse::{
    config::GatewayConfig, gateway::Gateway, routes::build_router,
    services::health_monitor::spawn_health_monitor, AppState,
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        services_dir = %config.services_dir.display(),
        addressing = ?config.addressing,
        "Starting gateway"
    );

    let gateway = Arc::new(Gateway::from_config(&config)?);

    // An unreadable services directory leaves the gateway up with no services
    match gateway.discover().await {
        Ok(outcome) => tracing::info!(
            services = outcome.services,
            failures = outcome.failures.len(),
            "Initial discovery complete"
        ),
        Err(e) => tracing::error!(error = %e, "Initial discovery failed"),
    }

    let ct = gateway.shutdown_token();
    let monitor = if config.health_interval.is_zero() {
        tracing::info!("Background health monitor disabled");
        None
    } else {
        Some(spawn_health_monitor(
            Arc::clone(&gateway),
            config.health_interval,
            ct.clone(),
        ))
    };

    let app = build_router(AppState::new(gateway));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Gateway running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(ct.clone()))
        .await?;

    if let Some(handle) = monitor {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Health monitor ended abnormally");
        }
    }

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal(ct: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    ct.cancel();
}
