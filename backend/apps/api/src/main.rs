//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::application::{OtpDispatcher, OtpDispatcherConfig};
use auth::middleware::require_auth;
use auth::{AuthComponents, AuthConfig, PgAuthRepository, auth_router, logout_router};
use axum::{
    Router, http,
    http::{Method, header},
    middleware,
};
use platform::cache::{CacheBackend, LruCacheStore, RedisCache};
use platform::config::{self as env_config, ConfigError};
use platform::mail::{HttpMailer, HttpMailerConfig, LogMailer, MailTransport};
use social::{PgSocialRepository, posts_router, social_state, users_router};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
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

/// Entries kept by the in-process cache when Redis is not configured.
const MEMORY_CACHE_CAPACITY: usize = 10_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,social=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env_config::required("DATABASE_URL")?;

    let pool = PgPoolOptions::new()
        .max_connections(env_config::parse_or("DATABASE_MAX_CONNECTIONS", 5)?)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Cache
    let cache = Arc::new(connect_cache().await);
    tracing::info!(backend = cache.name(), "Cache ready");

    // Auth: OTP mail runs on a background worker
    let auth_config = AuthConfig::from_env()?;
    let dispatcher = OtpDispatcher::spawn(
        Arc::new(mail_transport()?),
        OtpDispatcherConfig {
            from: auth_config.mail_from.clone(),
            ..OtpDispatcherConfig::default()
        },
    );
    let auth = AuthComponents::new(PgAuthRepository::new(pool.clone()), auth_config, dispatcher);

    let gate = |router: Router| {
        router.route_layer(middleware::from_fn_with_state(
            auth.gate(),
            require_auth::<PgAuthRepository>,
        ))
    };

    // Social
    let social = social_state(PgSocialRepository::new(pool.clone()), cache);

    // CORS configuration
    let frontend_origins = env_config::optional("FRONTEND_ORIGINS")
        .unwrap_or_else(|| "http://localhost:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers([header::AUTHORIZATION])
        .allow_credentials(true);

    // Build router
    let users = users_router(&social)
        .into_router(gate)
        .merge(gate(logout_router(&auth)));

    let app = Router::new()
        .nest("/api/auth", auth_router(&auth))
        .nest("/api/users", users)
        .nest("/api/posts", posts_router(&social).into_router(gate))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env_config::parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 4000)))?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Redis when `REDIS_URL` is set and reachable, otherwise the in-process LRU.
async fn connect_cache() -> CacheBackend {
    let Some(redis_url) = env_config::optional("REDIS_URL") else {
        return CacheBackend::Memory(LruCacheStore::new(MEMORY_CACHE_CAPACITY));
    };

    match RedisCache::connect(&redis_url).await {
        Ok(redis) => CacheBackend::Redis(redis),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Redis connection failed, falling back to in-process cache"
            );
            CacheBackend::Memory(LruCacheStore::new(MEMORY_CACHE_CAPACITY))
        }
    }
}

/// HTTP relay when `MAIL_API_URL` and `MAIL_API_KEY` are set, otherwise log only.
fn mail_transport() -> Result<MailTransport, anyhow::Error> {
    match (
        env_config::optional("MAIL_API_URL"),
        env_config::optional("MAIL_API_KEY"),
    ) {
        (Some(endpoint), Some(api_key)) => {
            let mailer = HttpMailer::new(HttpMailerConfig {
                endpoint,
                api_key,
                timeout: env_config::duration_secs("MAIL_TIMEOUT_SECS", Duration::from_secs(10))?,
            })?;
            Ok(MailTransport::Http(mailer))
        }
        (None, None) => {
            tracing::warn!("MAIL_API_URL not set, OTP mail will only be logged");
            Ok(MailTransport::Log(LogMailer))
        }
        _ => Err(ConfigError::Invalid {
            key: "MAIL_API_KEY",
            reason: "MAIL_API_URL and MAIL_API_KEY must be set together".to_string(),
        }
        .into()),
    }
}
