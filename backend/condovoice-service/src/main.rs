use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use condovoice_service::config::StoreBackend;
use condovoice_service::db::{self, MemoryStore, PgPostStore, PgResidentStore};
use condovoice_service::middleware::MetricsMiddleware;
use condovoice_service::storage::S3AvatarStorage;
use condovoice_service::{routes, AppState, Config};
use crypto_core::jwt;
use s3_utils::{S3Client, S3Config};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default();
    for origin in allowed_origins.split(',') {
        let origin = origin.trim();
        if origin.is_empty() {
            continue;
        }
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method().allow_any_header().max_age(3600)
}

fn io_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn build_state(config: &Config) -> io::Result<AppState> {
    let state = match config.store {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| io_error("Configuration", "DATABASE_URL is not set"))?;
            let pool = db::init_pool(url)
                .await
                .map_err(|e| io_error("Failed to initialize database", e))?;
            tracing::info!("Connected to PostgreSQL and applied migrations");

            AppState::new(
                Arc::new(PgResidentStore::new(pool.clone())),
                Arc::new(PgPostStore::new(pool)),
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            AppState::new(store.clone(), store)
        }
    };

    let state = state
        .with_feed(config.feed)
        .with_avatar_max_bytes(config.uploads.avatar_max_bytes);

    match S3Config::from_env() {
        Some(s3_config) => {
            tracing::info!(bucket = %s3_config.bucket, "Avatar uploads stored in S3");
            let client = S3Client::with_config(s3_config).await;
            Ok(state.with_avatars(Arc::new(S3AvatarStorage::new(client))))
        }
        None => {
            tracing::warn!("S3_BUCKET not set; avatar uploads are disabled");
            Ok(state)
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// CondoVoice Service
///
/// REST backend for the condominium community app.
///
/// # Routes
///
/// - `/api/v1/auth/*` - registration, login, token refresh
/// - `/api/v1/feed`, `/api/v1/posts/*` - feed, posts, likes, comments, polls
/// - `/api/v1/polls/stats` - poll statistics
/// - `/api/v1/residents/*` - resident directory
/// - `/api/v1/profile/*` - own profile and avatar upload
/// - `/api/v1/health/*`, `/metrics` - operations
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log.json);
    tracing::info!("Starting condovoice-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    jwt::initialize_jwt_keys(&config.jwt.private_key_pem, &config.jwt.public_key_pem)
        .map_err(|e| io_error("Failed to initialize JWT keys", format!("{:#}", e)))?;

    let state = web::Data::new(build_state(&config).await?);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(MetricsMiddleware)
            .wrap(build_cors(&allowed_origins))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_address)?
    .run();

    let server_handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(res) => res?,
                Err(e) => return Err(io_error("HTTP server task failed", e)),
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    tracing::info!("condovoice-service shutting down");
    Ok(())
}
