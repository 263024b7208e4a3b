//! Minipress HTTP gateway
//!
//! The entry point for all external requests. Handles:
//! - Public article browsing and contact intake
//! - The administrative surface (capability-checked)
//! - Observability (logging, metrics, tracing)

mod handlers;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use minipress_common::{
    config::AppConfig,
    db::DbPool,
    mail,
    metrics::{self, RequestMetrics},
    notify::{self, Notifier},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub notifier: Notifier,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .json()
        .init();

    info!("Starting Minipress gateway v{}", minipress_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Mail transport and the notification dispatcher worker. Pending
    // notifications are not drained at shutdown.
    let transport = mail::build_transport(&config.mail)?;
    let (notifier, _dispatcher) =
        notify::spawn_dispatcher(&config.mail, config.notifier.queue_capacity, transport);

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        notifier,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Public routes
    let public_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Article browsing
        .route("/articles", get(handlers::articles::list_articles))
        .route("/articles/{slug_id}", get(handlers::articles::get_article))
        // Contact intake
        .route(
            "/contact",
            get(handlers::contact::contact_form).post(handlers::contact::submit_contact),
        )
        .route("/contact/success", get(handlers::contact::contact_success));

    // Administrative routes (capability-checked per handler)
    let admin_routes = Router::new()
        .route(
            "/articles",
            get(handlers::admin::list_articles).post(handlers::admin::create_article),
        )
        .route(
            "/articles/{id}",
            get(handlers::admin::get_article)
                .put(handlers::admin::update_article)
                .delete(handlers::admin::delete_article),
        )
        .route(
            "/contact-requests",
            get(handlers::admin::list_contact_requests)
                .post(handlers::admin::create_contact_request),
        )
        .route(
            "/contact-requests/{id}",
            get(handlers::admin::get_contact_request)
                .put(handlers::admin::update_contact_request)
                .delete(handlers::admin::delete_contact_request),
        );

    // Compose the app
    Router::new()
        .merge(public_routes)
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Record count and latency for every request
async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let metrics = RequestMetrics::start(&method, &path);
    let response = next.run(request).await;
    metrics.finish(response.status().as_u16());

    response
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
