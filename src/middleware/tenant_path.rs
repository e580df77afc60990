use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::Response,
};

use crate::resolver;
use crate::state::AppState;

/// Tenant id captured from a `/t/<tenant>/...` URL, recorded for the
/// resolver after the prefix has been stripped.
#[derive(Debug, Clone)]
pub struct PathTenant(pub String);

/// Strips the tenant path prefix ahead of routing, so route definitions stay
/// tenant-agnostic. Applied around the whole router, not as a route layer.
pub async fn strip_tenant_prefix(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let prefix = &state.config.tenancy.path_prefix;

    if let Some((tenant, remainder)) = resolver::split_path_prefix(request.uri().path(), prefix) {
        let rewritten = match request.uri().query() {
            Some(query) => format!("{}?{}", remainder, query),
            None => remainder,
        };

        match rewritten.parse::<Uri>() {
            Ok(uri) => {
                tracing::debug!(tenant = tenant.as_str(), uri = %uri, "stripped tenant path prefix");
                *request.uri_mut() = uri;
                request.extensions_mut().insert(PathTenant(tenant));
            }
            Err(err) => {
                // Remainder came from a parsed URI path; leave the request
                // untouched if it somehow fails to re-parse
                tracing::warn!(error = %err, "failed to rewrite tenant-prefixed uri");
            }
        }
    }

    next.run(request).await
}
