use axum::ServiceExt;
use tower::Layer;

use tenant_gate::config::AppConfig;
use tenant_gate::middleware::strip_tenant_prefix;
use tenant_gate::registry::Tenant;
use tenant_gate::server;
use tenant_gate::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up SECURITY_JWT_SECRET etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting tenant-gate in {:?} mode", config.environment);

    let state = AppState::new(config);
    seed_tenants(&state).await;

    let router = server::router(state.clone());
    // Prefix stripping must happen before routing, so it wraps the router
    // instead of layering inside it
    let app =
        axum::middleware::from_fn_with_state(state, strip_tenant_prefix).layer(router);

    // Allow tests or deployments to override port via env
    let port = std::env::var("TENANT_GATE_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("tenant-gate listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server");
}

/// Provision tenants named in TENANT_SEED (comma-separated) at startup.
/// Real provisioning lives with the onboarding flow; this covers local runs.
async fn seed_tenants(state: &AppState) {
    let Ok(seed) = std::env::var("TENANT_SEED") else {
        return;
    };

    for name in seed.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match state.registry.insert(Tenant::new(name, name)).await {
            Ok(()) => tracing::info!(tenant = name, "seeded tenant"),
            Err(e) => tracing::error!(tenant = name, error = %e, "failed to seed tenant"),
        }
    }
}
