//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::{Context, bail};
use auth::{AuthConfig, PgAuthRepository, RequesterState, auth_router, resolve_requester};
use axum::{
    Router,
    body::Body,
    http,
    http::{Method, Request, header},
    middleware::{self, Next},
};
use base64::Engine;
use base64::engine::general_purpose;
use catalog::{CatalogConfig, PgCatalogRepository, catalog_router};
use platform::mail::{AppMailer, EmailConfig};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

/// Parse an optional environment variable, keeping `default` when unset
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("{key} is not valid")),
        _ => Ok(default),
    }
}

/// `SECRET_KEY` (base64, 32 bytes); random in debug builds when unset
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let defaults = AuthConfig::default();
    let base = match env::var("SECRET_KEY") {
        Ok(secret_b64) => {
            let secret_bytes = Engine::decode(&general_purpose::STANDARD, secret_b64.trim())
                .context("SECRET_KEY must be base64")?;
            let Ok(secret_key) = <[u8; 32]>::try_from(secret_bytes.as_slice()) else {
                bail!("SECRET_KEY must decode to 32 bytes");
            };
            AuthConfig {
                secret_key,
                ..defaults
            }
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("SECRET_KEY not set, using a random development secret");
            AuthConfig::with_random_secret()
        }
        Err(_) => bail!("SECRET_KEY must be set in production"),
    };

    Ok(AuthConfig {
        access_token_ttl: Duration::from_secs(env_or(
            "JWT_ACCESS_TTL_SECS",
            base.access_token_ttl.as_secs(),
        )?),
        confirmation_code_ttl: Duration::from_secs(env_or(
            "CONFIRMATION_CODE_TTL_SECS",
            base.confirmation_code_ttl.as_secs(),
        )?),
        default_page_size: env_or("DEFAULT_PAGE_SIZE", base.default_page_size)?,
        ..base
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

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

    let auth_config = load_auth_config()?;
    let catalog_config = CatalogConfig {
        default_page_size: auth_config.default_page_size,
    };

    let mailer = AppMailer::from_config(&EmailConfig::from_env())?;
    let auth_repo = PgAuthRepository::new(pool.clone());
    let catalog_repo = PgCatalogRepository::new(pool.clone());

    let requester_state = RequesterState {
        repo: Arc::new(auth_repo.clone()),
        config: Arc::new(auth_config.clone()),
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router; every request resolves its bearer token first
    let api = auth_router(auth_repo, mailer, auth_config)
        .merge(catalog_router(catalog_repo, catalog_config))
        .layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            resolve_requester(requester_state.clone(), req, next)
        }));

    let app = Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env_or("BIND_ADDR", DEFAULT_BIND_ADDR.parse()?)?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
