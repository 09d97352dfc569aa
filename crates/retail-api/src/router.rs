//! Router configuration and server setup.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::handlers;
use crate::middleware::{login_rate_limit, rate_limit};
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let login = Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route_layer(from_fn_with_state(state.clone(), login_rate_limit));

    Router::new()
        // Health
        .route("/api/health", get(handlers::health))
        // Auth
        .route("/api/auth/me", get(handlers::me))
        // Stores
        .route(
            "/api/stores",
            get(handlers::list_stores).post(handlers::create_store),
        )
        .route(
            "/api/stores/:id",
            get(handlers::get_store)
                .patch(handlers::update_store)
                .delete(handlers::delete_store),
        )
        .route(
            "/api/stores/:id/messages",
            get(handlers::list_messages).post(handlers::post_message),
        )
        // Users
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/:id",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // Tasks
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/:id",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route(
            "/api/tasks/:id/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        // Forms
        .route(
            "/api/forms",
            get(handlers::list_forms).post(handlers::create_form),
        )
        .route(
            "/api/forms/:id",
            get(handlers::get_form)
                .patch(handlers::update_form)
                .delete(handlers::delete_form),
        )
        .route(
            "/api/forms/:id/submissions",
            get(handlers::list_submissions).post(handlers::submit_form),
        )
        // Notifications
        .route(
            "/api/notifications",
            get(handlers::list_notifications).post(handlers::create_notification),
        )
        .route(
            "/api/notifications/read-all",
            post(handlers::mark_all_notifications_read),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::mark_notification_read),
        )
        // Finance
        .route(
            "/api/finance",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route("/api/finance/summary", get(handlers::finance_summary))
        .route(
            "/api/finance/:id",
            patch(handlers::update_entry).delete(handlers::delete_entry),
        )
        .merge(login)
        // Limiter innermost so CORS preflights never reach it.
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(from_fn_with_state(state.clone(), rate_limit)),
        )
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Starts the API server and runs until Ctrl-C or SIGTERM.
pub async fn serve(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);

    let purge = tokio::spawn(purge_rate_limits(state.clone()));
    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    purge.abort();
    info!("API server stopped");
    result
}

/// Drops expired limiter windows so idle clients do not accumulate.
async fn purge_rate_limits(state: AppState) {
    let period = state.limiter.window().max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let now = Instant::now();
        let dropped = state.limiter.purge_expired(now) + state.login_limiter.purge_expired(now);
        if dropped > 0 {
            debug!(dropped, "Purged expired rate limit windows");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
