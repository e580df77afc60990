use axum::extract::{Extension, State};
use std::collections::BTreeMap;

use crate::context::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::registry::FeatureFlag;
use crate::state::AppState;

/// GET /api/settings - the context tenant's feature flags.
pub async fn settings_get(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
) -> ApiResult<BTreeMap<FeatureFlag, bool>> {
    let tenant = state.registry.get(context.tenant_id()).await?;

    Ok(ApiResponse::success(tenant.settings))
}
