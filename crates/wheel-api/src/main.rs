//! Wheel API server entry point.

use std::sync::{Arc, Mutex};

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wheel_api::config::AppConfig;
use wheel_api::error::AppError;
use wheel_api::routes;
use wheel_api::state::AppState;
use wheel_core::clock::SystemClock;
use wheel_core::rng::{DeterministicRng, SystemRng};
use wheel_draw::application::snapshot::{load_session, save_session};
use wheel_store::JsonFileStore;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("Starting wheel draw server");

    let config = AppConfig::from_env()?;

    let store = Arc::new(JsonFileStore::open(&config.store_path).await?);
    let session = load_session(&*store).await?;
    info!(
        path = %store.path().display(),
        items = session.pool().len(),
        winners = session.winners().len(),
        "session loaded"
    );

    let rng = match config.rng_seed {
        Some(seed) => SystemRng::from_seed(seed),
        None => SystemRng::from_entropy(),
    };
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let app_state = AppState::new(
        session,
        store,
        Arc::new(SystemClock),
        rng,
        config.spin,
    );

    // The renderer is served from its own origin.
    let app = routes::build_router(app_state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let session = app_state.session.lock().await;
    save_session(&session, app_state.store.as_ref()).await?;
    info!("session saved");

    Ok(())
}
