use std::sync::Arc;

use cardiosense::api::router::create_router;
use cardiosense::config::AppConfig;
use cardiosense::ensemble::Ensemble;
use cardiosense::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = cardiosense::metrics::init_metrics();

    // A missing or corrupt artifact is not fatal: the server comes up in a
    // degraded mode where /health reports ensemble_ready=false and every
    // prediction fails at request time.
    let ensemble = match Ensemble::load(&config.model_path) {
        Ok(e) => {
            tracing::info!(
                path = %config.model_path,
                features = e.feature_names.len(),
                trained_at = %e.trained_at,
                "Ensemble loaded successfully."
            );
            metrics::gauge!("ensemble_loaded").set(1.0);
            Some(Arc::new(e))
        }
        Err(e) => {
            tracing::error!(path = %config.model_path, "Failed to load ensemble: {e:#}");
            None
        }
    };

    let state = AppState {
        config,
        ensemble,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
