use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::context::TenantContext;
use crate::error::ApiError;
use crate::registry::RegistryError;
use crate::resolver::{self, Resolution};
use crate::state::AppState;

use super::tenant_path::PathTenant;

/// Isolation gate: reconciles the resolved tenant identity against the token
/// claims and attaches the request's `TenantContext`.
///
/// Hard fail-closed. A signal conflict, a claim/resolution mismatch or an
/// unregistered tenant terminates the request here; no downstream handler
/// runs.
pub async fn tenant_gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| {
            ApiError::internal_server_error("Token verification must run before the tenant gate")
        })?;

    let path_tenant = request
        .extensions()
        .get::<PathTenant>()
        .map(|p| p.0.clone());

    let host = request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| request.uri().authority().map(|a| a.to_string()));

    let resolution = resolver::resolve(
        request.headers(),
        path_tenant.as_deref(),
        host.as_deref(),
        &state.config.tenancy,
    )?;

    let (tenant_id, source) = match resolution {
        Resolution::Resolved { tenant_id, source } => (tenant_id, source),
        Resolution::Conflict { signals } => {
            tracing::warn!(?signals, "rejected request with disagreeing tenant signals");
            return Err(ApiError::ConflictingTenantSignal { signals });
        }
    };

    if claims.tenant != tenant_id {
        tracing::warn!(
            claimed = claims.tenant.as_str(),
            resolved = tenant_id.as_str(),
            "rejected request with mismatched tenant identity"
        );
        return Err(ApiError::TenantMismatch {
            claimed: claims.tenant,
            resolved: tenant_id,
        });
    }

    // A valid token for an unregistered tenant never passes
    match state.registry.get(&tenant_id).await {
        Ok(_) => {}
        Err(RegistryError::NotFound(_)) => {
            tracing::warn!(tenant = tenant_id.as_str(), "rejected request for unknown tenant");
            return Err(ApiError::UnknownTenant(tenant_id));
        }
        Err(RegistryError::Unavailable(msg)) => {
            // Internal fault, reported as such rather than masked as an
            // unknown tenant
            return Err(ApiError::DependencyUnavailable(msg));
        }
        Err(other) => {
            return Err(ApiError::internal_server_error(other.to_string()));
        }
    }

    let context = TenantContext::new(
        tenant_id,
        source,
        claims.sub,
        claims.roles.into_iter().collect(),
    );

    tracing::debug!(
        tenant = context.tenant_id(),
        source = context.source().as_str(),
        "tenant gate passed"
    );

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
