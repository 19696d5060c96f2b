use std::net::SocketAddr;

use axum::middleware;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carwash_backend::{
    config::Config,
    db,
    middleware::rate_limit::{create_global_governor, log_request},
    routes, AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carwash_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> carwash_backend::AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting server at {}", config.server_addr());

    // Connect to database
    let db = db::connect(&config).await?;
    tracing::info!("Connected to database");

    // Run migrations
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations complete");

    let state = AppState {
        db,
        config: config.clone(),
    };

    let mut app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    if config.rate_limit_enabled {
        app = app.layer(create_global_governor());
    } else {
        tracing::warn!("Rate limiting disabled");
    }

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        carwash_backend::AppError::Config(format!("Invalid server address: {}", e))
    })?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| carwash_backend::AppError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| carwash_backend::AppError::Internal(format!("Server error: {}", e)))
}
