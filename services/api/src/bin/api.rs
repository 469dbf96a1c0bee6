//! services/api/src/bin/api.rs

use account_core::{AccountService, AccountStore, IdentityProvider};
use api_lib::{
    adapters::{
        FirestoreAdapter, IdentityToolkitAdapter, InMemoryAccountStore, InMemoryIdentityProvider,
    },
    config::{Backend, Config},
    error::ApiError,
    web::{app_router, rest::ApiDoc, AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DEV_USER_EMAIL: &str = "dev@example.com";

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let (store, identity): (Arc<dyn AccountStore>, Arc<dyn IdentityProvider>) =
        match &config.backend {
            Backend::Firebase(firebase) => {
                info!(project = %firebase.project_id, "Using Firebase backend");
                let client = reqwest::Client::builder()
                    .user_agent(APP_USER_AGENT)
                    .timeout(config.upstream_timeout)
                    .build()?;
                let store = FirestoreAdapter::new(
                    client.clone(),
                    firebase.firestore_url.clone(),
                    firebase.project_id.clone(),
                    firebase.access_token.clone(),
                    config.users_collection.clone(),
                );
                let identity = IdentityToolkitAdapter::new(
                    client,
                    firebase.identity_toolkit_url.clone(),
                    firebase.project_id.clone(),
                    firebase.access_token.clone(),
                );
                let store: Arc<dyn AccountStore> = Arc::new(store);
                let identity: Arc<dyn IdentityProvider> = Arc::new(identity);
                (store, identity)
            }
            Backend::Memory => {
                warn!("Using in-memory backend, accounts are lost on restart");
                let identity = InMemoryIdentityProvider::new();
                let id_token = identity.seed_dev_user(DEV_USER_EMAIL).await?;
                // Tokens stay out of the logs; the in-memory backend is dev only.
                println!("Development idToken for {DEV_USER_EMAIL}: {id_token}");
                let store: Arc<dyn AccountStore> = Arc::new(InMemoryAccountStore::new());
                let identity: Arc<dyn IdentityProvider> = Arc::new(identity);
                (store, identity)
            }
        };

    // --- 3. Build the Shared AppState ---
    let accounts = AccountService::new(store, identity);
    let app_state = Arc::new(AppState::new(accounts, &config));

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(app_router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
