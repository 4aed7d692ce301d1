//! services/portal/src/bin/portal.rs

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use portal_lib::{
    adapters::{RestApiAdapter, RosterImageRenderer},
    config::Config,
    error::PortalError,
    web::{
        self,
        rest::ApiDoc,
        state::{spawn_session_sweeper, SessionStore},
        AppState,
    },
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), PortalError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let api = RestApiAdapter::new(config.remote_api_url.clone(), config.request_timeout)?;
    info!("Platform API at {}", config.remote_api_url);
    let renderer = Arc::new(RosterImageRenderer::load(
        &config.roster_base_image,
        &config.roster_font,
    )?);

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        api,
        renderer,
        viewers: Arc::new(SessionStore::default()),
        rosters: Arc::new(SessionStore::default()),
    });

    spawn_session_sweeper(app_state.clone());
    info!(
        "Idle sessions expire after {}s",
        config.session_idle_timeout.as_secs()
    );

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        PortalError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = web::router(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
