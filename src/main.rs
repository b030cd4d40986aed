use anyhow::Result;
use dev_portal::{open_store, web, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting developer portal");

    // Load configuration from environment
    let config = dev_portal::config::Config::load()?;
    tracing::info!(
        portal_public_url = %config.portal_public_url,
        cognito_domain = %config.portal.cognito_domain,
        redirect_uri = %config.portal.redirect_uri,
        api_base_url = %config.portal.api_base_url,
        "Configuration loaded"
    );

    let missing = config.portal.missing_fields();
    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            "Configuration incomplete - login stays disabled until these are set"
        );
    }

    let store = open_store(&config);
    let bind_address = config.bind_address();
    let state = Arc::new(AppState::new(config, store)?);

    let app = web::create_router(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Portal listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
