use axum::{middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::middleware::{rate_limit_middleware, tenant_gate_middleware, token_auth_middleware};
use crate::state::AppState;

/// Build the application router. Every `/api` route runs the full pipeline:
/// token verification, then the isolation gate, then rate admission.
///
/// The tenant path prefix is stripped ahead of routing, so callers must still
/// wrap this router with `strip_tenant_prefix` (see `main.rs`); routes here
/// are tenant-agnostic.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Tenant-scoped API
        .merge(api_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    use handlers::{admin, protected};

    Router::new()
        .route("/api/whoami", get(protected::whoami_get))
        .route("/api/theme", get(protected::theme_get))
        .route("/api/settings", get(protected::settings_get))
        .route(
            "/api/admin/tenant",
            get(admin::tenant_show).put(admin::tenant_update),
        )
        // Innermost first: token verification runs before the gate, the gate
        // before rate admission
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), tenant_gate_middleware))
        .layer(middleware::from_fn_with_state(state, token_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Tenant Gate",
            "version": version,
            "description": "Tenant context resolution and isolation enforcement layer",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "whoami": "/api/whoami (tenant-scoped)",
                "theme": "/api/theme (tenant-scoped)",
                "settings": "/api/settings (tenant-scoped)",
                "admin": "/api/admin/tenant (tenant-scoped, admin role)",
            }
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
