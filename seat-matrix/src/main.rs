use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use seat_matrix::config::AppConfig;
use seat_matrix::credentials::{CredentialSource, EnvCredentials, FileCredentials};
use seat_matrix::shohoz::ShohozClient;
use seat_matrix::store::{MatrixStore, StoreConfig};
use seat_matrix::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seat_matrix=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let credentials: Arc<dyn CredentialSource> = match &config.credentials_file {
        Some(path) => {
            info!(path = %path.display(), "reading credentials from file");
            Arc::new(FileCredentials::new(path))
        }
        None => Arc::new(EnvCredentials),
    };
    if credentials.credentials().is_none() {
        warn!("no credentials found; API calls will ask the user to sign in");
    }

    let client = ShohozClient::new(config.shohoz.clone(), credentials)?;
    let store = MatrixStore::new(&StoreConfig {
        ttl: config.store_ttl,
        ..StoreConfig::default()
    });

    let state = AppState::new(client, config.engine.clone(), store);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "seat matrix server listening");
    info!("  GET    /health");
    info!("  POST   /api/matrix                    - build a seat matrix");
    info!("  GET    /api/matrix/:id/routes         - compose routes");
    info!("  GET    /api/availability              - seat layouts on a route");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    info!("shut down");
    Ok(())
}
