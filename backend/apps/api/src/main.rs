//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::{Context, bail};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unlock::{
    DEFAULT_BUCKET, PgCreatorRepository, PgResourceRepository, SignedTokenIdentity,
    StorageConfig, SupabaseStorage, UnlockConfig, UnlockSessionStore, unlock_router,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,unlock=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Object storage
    let storage = SupabaseStorage::new(StorageConfig {
        base_url: env::var("STORAGE_URL").context("STORAGE_URL must be set")?,
        service_key: env::var("STORAGE_SERVICE_KEY").context("STORAGE_SERVICE_KEY must be set")?,
        bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
    })?;

    // Creator identity
    let identity = SignedTokenIdentity::new(identity_secret()?);

    let config = UnlockConfig::default();
    let sweep_interval = config.sweep_interval;
    let idle_ms = config.session_idle_ttl_ms();

    let (unlock_routes, state) = unlock_router(
        PgResourceRepository::new(pool.clone()),
        PgCreatorRepository::new(pool.clone()),
        storage,
        identity,
        config,
    );

    spawn_session_sweeper(state.sessions.clone(), sweep_interval, idle_ms);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .nest("/api", unlock_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    // Peer addresses feed the visitor fingerprint's client IP
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Shared secret for creator bearer tokens
///
/// Debug builds fall back to a random secret, so tokens do not survive restarts.
fn identity_secret() -> anyhow::Result<[u8; 32]> {
    match env::var("IDENTITY_TOKEN_SECRET") {
        Ok(secret_b64) => {
            let bytes = general_purpose::STANDARD
                .decode(secret_b64.trim())
                .context("IDENTITY_TOKEN_SECRET must be Base64")?;
            let secret: [u8; 32] = bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("IDENTITY_TOKEN_SECRET must decode to 32 bytes"))?;
            Ok(secret)
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("IDENTITY_TOKEN_SECRET not set, using a random development secret");
            Ok(platform::crypto::random_secret())
        }
        Err(_) => bail!("IDENTITY_TOKEN_SECRET must be set in production"),
    }
}

/// Periodically drop unlock sessions whose visitor went away
fn spawn_session_sweeper(sessions: Arc<UnlockSessionStore>, interval: Duration, idle_ms: i64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            sessions.sweep_idle(idle_ms).await;
        }
    });
}
