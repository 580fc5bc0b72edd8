use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use library_api::{build_router, AppState, Ports};
use library_infrastructure::{
    create_pool, run_migrations, CampusGateway, LocalCoverStore, PgCategoryRepository, PgCollectionRepository,
    PgGuestLogRepository, PgMemberRepository, PgUserRepository,
};
use library_shared::config::AppConfig;
use library_shared::constants::RATE_LIMIT_PURGE_SECS;

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin.trim() {
        "*" => AllowOrigin::from(Any),
        other => match other.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(origin = other, "Invalid CORS origin, allowing any");
                AllowOrigin::from(Any)
            }
        },
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    library_shared::telemetry::init_telemetry()?;

    info!("Library server starting...");

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to Database
    info!("Connecting to database...");
    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;
    info!("Database connection established.");

    // Adapters
    let ports = Ports {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        members: Arc::new(PgMemberRepository::new(pool.clone())),
        categories: Arc::new(PgCategoryRepository::new(pool.clone())),
        collections: Arc::new(PgCollectionRepository::new(pool.clone())),
        guest_logs: Arc::new(PgGuestLogRepository::new(pool)),
        gateway: Arc::new(CampusGateway::new(&config.campus)?),
        covers: Arc::new(LocalCoverStore::new(&config.uploads)),
    };
    let state = AppState::new(ports, &config);

    // Forget idle clients of the login rate limiter
    let limiter = state.auth_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(RATE_LIMIT_PURGE_SECS));
        loop {
            ticker.tick().await;
            limiter.purge();
        }
    });

    // Build router
    let app = build_router(state)
        // Uploaded covers
        .nest_service(&config.uploads.public_path, ServeDir::new(&config.uploads.dir))
        .layer(DefaultBodyLimit::max(config.uploads.max_body_mb * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.app.cors_origin));

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
