use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::HeaderValue,
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use acadoc_api::audit::{AuditDedup, AuditLogger};
use acadoc_api::config;
use acadoc_api::database::DatabaseManager;
use acadoc_api::handlers::{elevated, protected, public};
use acadoc_api::middleware::{admin_only_middleware, jwt_auth_middleware};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acadoc_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = config::config();
    info!("starting in {:?} mode", config.environment);

    // Migrations are best-effort at startup; the pool itself is created
    // lazily on first use so the process can come up before the database.
    tokio::spawn(async {
        match DatabaseManager::migrate().await {
            Ok(()) => info!("database migrations applied"),
            Err(err) => warn!("migrations not applied at startup: {}", err),
        }
    });

    let audit = Arc::new(AuditLogger::new(AuditDedup::new(
        chrono::Duration::seconds(config.audit.dedup_window_secs),
        config.audit.dedup_capacity,
    )));

    {
        let audit = audit.clone();
        let interval = Duration::from_secs(config.audit.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                audit.sweep().await;
            }
        });
    }

    let app = build_router(audit);

    let port = std::env::var("ACADOC_API_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(audit: Arc<AuditLogger>) -> Router {
    let config = config::config();

    let public_routes = Router::new()
        .route("/", get(public::health::root))
        .route("/health", get(public::health::health_check))
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login));

    let protected_routes = Router::new()
        .route("/api/me", get(protected::profile::me))
        .route(
            "/api/documents",
            get(protected::documents::list_documents).post(protected::documents::create_document),
        )
        .route(
            "/api/documents/:id",
            get(protected::documents::get_document)
                .put(protected::documents::update_document)
                .delete(protected::documents::delete_document),
        )
        .route(
            "/api/documents/:id/download",
            get(protected::documents::download_document),
        )
        .route(
            "/api/documents/:id/comments",
            get(protected::comments::list_document_comments)
                .post(protected::comments::create_comment),
        )
        .route(
            "/api/comments/:id",
            put(protected::comments::update_comment).delete(protected::comments::delete_comment),
        )
        .route(
            "/api/comments/:id/reply-gate",
            get(protected::comments::reply_gate),
        )
        .route_layer(from_fn(jwt_auth_middleware));

    let admin_routes = Router::new()
        .route(
            "/api/admin/documents/deleted",
            get(elevated::documents::list_deleted_documents),
        )
        .route(
            "/api/admin/documents/:id/restore",
            post(elevated::documents::restore_document),
        )
        .route(
            "/api/admin/subjects",
            get(elevated::subjects::list_subjects),
        )
        .route(
            "/api/admin/assignments",
            post(elevated::assignments::create_assignment),
        )
        .route(
            "/api/admin/assignments/:subject_id/:role",
            delete(elevated::assignments::delete_assignment),
        )
        .route_layer(from_fn(admin_only_middleware))
        .route_layer(from_fn(jwt_auth_middleware));

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(Extension(audit)),
        )
}
