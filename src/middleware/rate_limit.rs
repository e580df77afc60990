use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::context::TenantContext;
use crate::error::ApiError;
use crate::ratelimit::Admission;
use crate::state::AppState;

/// Per-tenant request admission. Runs after the tenant gate and keys the
/// counter by the enforced identity, never by a re-derived signal.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.rate.enabled {
        return Ok(next.run(request).await);
    }

    let context = request.extensions().get::<TenantContext>().ok_or_else(|| {
        ApiError::internal_server_error("Tenant gate must run before rate admission")
    })?;

    match state.limiter.admit(context.tenant_id()) {
        Admission::Allowed => Ok(next.run(request).await),
        Admission::Rejected { retry_after } => {
            let retry_after_secs = retry_after.as_secs().max(1);
            tracing::warn!(
                tenant = context.tenant_id(),
                retry_after_secs,
                "request rejected by rate admission"
            );
            Err(ApiError::RateLimitExceeded { retry_after_secs })
        }
    }
}
