use axum::extract::Extension;
use serde_json::{json, Value};

use crate::context::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/whoami - the request's enforced tenant identity.
///
/// Everything in this response comes from the `TenantContext` built by the
/// isolation gate; nothing is re-derived from transport signals.
pub async fn whoami_get(Extension(context): Extension<TenantContext>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "tenant_id": context.tenant_id(),
        "resolution_source": context.source().as_str(),
        "user_id": context.user_id(),
        "roles": context.roles(),
    })))
}
