use axum::extract::{Extension, Json, State};

use crate::context::TenantContext;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::registry::{Tenant, TenantPatch};
use crate::state::AppState;

/// GET /api/admin/tenant - show the context tenant's record.
pub async fn tenant_show(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
) -> ApiResult<Tenant> {
    require_admin(&context)?;

    let tenant = state.registry.get(context.tenant_id()).await?;

    Ok(ApiResponse::success(tenant))
}

/// PUT /api/admin/tenant - apply a patch to the context tenant.
///
/// The registry write and the theme cache invalidation happen inside
/// `AppState::update_tenant`, write first, so this response can only reflect
/// an already-invalidated cache.
pub async fn tenant_update(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
    Json(patch): Json<TenantPatch>,
) -> ApiResult<Tenant> {
    require_admin(&context)?;

    let tenant = state
        .update_tenant(context.tenant_id(), patch, &context)
        .await?;

    tracing::info!(
        tenant = context.tenant_id(),
        revision = tenant.revision,
        "tenant updated by admin"
    );

    Ok(ApiResponse::success(tenant))
}

fn require_admin(context: &TenantContext) -> Result<(), ApiError> {
    if context.has_role("admin") {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin role required"))
    }
}
