use axum::extract::{Extension, State};

use crate::context::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::registry::Theme;
use crate::state::AppState;

/// GET /api/theme - the context tenant's theme, via the read-through cache.
pub async fn theme_get(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
) -> ApiResult<Theme> {
    let theme = state
        .themes
        .get_theme(&state.registry, context.tenant_id())
        .await?;

    Ok(ApiResponse::success((*theme).clone()))
}
