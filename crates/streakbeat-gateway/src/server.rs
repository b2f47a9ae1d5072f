//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use streakbeat_core::config::GatewayConfig;
use streakbeat_scheduler::{Pipeline, Scheduler};

/// Shared state for the gateway server.
pub struct AppState {
    /// The same pipeline instance the long-lived driver ticks.
    pub pipeline: Arc<Pipeline>,
    /// Present when an in-process scheduler runs alongside the gateway;
    /// absent in external-cron deployments.
    pub scheduler: Option<Arc<Scheduler>>,
    /// Bearer secret for the cron trigger. `None` disables the check.
    pub cron_secret: Option<String>,
    pub start_time: std::time::Instant,
}

/// True when the Authorization header carries the expected bearer secret.
pub fn bearer_matches(header: Option<&str>, expected: &str) -> bool {
    header
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token == expected)
        .unwrap_or(false)
}

/// Bearer-secret middleware for the cron trigger and status routes.
/// With no secret configured all calls pass (the startup warning covers it).
async fn require_cron_secret(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = &state.cron_secret else {
        return next.run(req).await;
    };

    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if bearer_matches(header, expected) {
        return next.run(req).await;
    }

    (
        axum::http::StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"error": "Unauthorized — invalid or missing bearer secret"})),
    )
        .into_response()
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Protected routes — bearer secret when configured
    let protected = Router::new()
        .route("/api/v1/cron/notifications", post(super::routes::cron_tick))
        .route(
            "/api/v1/scheduler/status",
            get(super::routes::scheduler_status),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_cron_secret,
        ));

    // Public routes — no auth
    let public = Router::new().route("/health", get(super::routes::health_check));

    protected
        .merge(public)
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    if state.cron_secret.is_none() {
        tracing::warn!(
            "⚠️ No cron secret configured — the trigger endpoint accepts unauthenticated calls. \
             Set STREAKBEAT_CRON_SECRET before deploying."
        );
    }

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_matches() {
        assert!(bearer_matches(Some("Bearer s3cret"), "s3cret"));
        assert!(!bearer_matches(Some("Bearer wrong"), "s3cret"));
        assert!(!bearer_matches(Some("s3cret"), "s3cret")); // missing scheme
        assert!(!bearer_matches(Some("bearer s3cret"), "s3cret")); // case-sensitive
        assert!(!bearer_matches(None, "s3cret"));
    }
}
