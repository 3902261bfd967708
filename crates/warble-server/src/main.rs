mod config;

use tower_http::cors::CorsLayer;
use tracing::info;

use warble_api::AppStateInner;
use warble_avatar::AvatarGenerator;
use warble_store::seed::seed_demo;
use warble_store::{GuestNameGenerator, PostStore, UserRegistry};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warble=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Stores
    let users = UserRegistry::new(
        AvatarGenerator::new(config.avatar_palette),
        GuestNameGenerator::default(),
    )
    .with_max_guest_attempts(config.guest_attempts);
    let posts = PostStore::new();

    if config.seed_demo {
        seed_demo(&users, &posts)?;
    }

    let state = AppStateInner::new(users, posts, config.app_name.clone(), config.session_ttl);
    let app = warble_api::router(state).layer(CorsLayer::permissive());

    let addr = config.addr()?;
    info!("{} listening on {}", config.app_name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
