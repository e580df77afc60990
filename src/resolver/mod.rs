use axum::http::HeaderMap;
use serde::Serialize;

use crate::config::TenancyConfig;

/// Transport signal a requested tenant identity was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Header,
    PathPrefix,
    Subdomain,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Header => "header",
            ResolutionSource::PathPrefix => "path_prefix",
            ResolutionSource::Subdomain => "subdomain",
        }
    }
}

/// Tagged resolution result. Disagreement between explicit signals is
/// surfaced as `Conflict`, never papered over by precedence.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved {
        tenant_id: String,
        source: ResolutionSource,
    },
    Conflict {
        signals: Vec<(ResolutionSource, String)>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No tenant signal present on the request")]
    UnresolvedTenant,
}

/// Derive the requested tenant identity from transport signals.
///
/// Precedence: trusted header, then path prefix, then subdomain. The header
/// and path prefix are explicit claims: when both are present and disagree
/// the result is `Resolution::Conflict`. The subdomain is ambient (every
/// request carries a host), so it is consulted only when neither explicit
/// signal exists.
///
/// `path_tenant` is the id captured when the `/t/<tenant>/` prefix was
/// stripped ahead of routing.
pub fn resolve(
    headers: &HeaderMap,
    path_tenant: Option<&str>,
    host: Option<&str>,
    cfg: &TenancyConfig,
) -> Result<Resolution, ResolveError> {
    let header_tenant = header_signal(headers, &cfg.header_name);
    let path_tenant = path_tenant
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    match (header_tenant, path_tenant) {
        (Some(h), Some(p)) if h != p => Ok(Resolution::Conflict {
            signals: vec![
                (ResolutionSource::Header, h),
                (ResolutionSource::PathPrefix, p),
            ],
        }),
        (Some(h), _) => Ok(Resolution::Resolved {
            tenant_id: h,
            source: ResolutionSource::Header,
        }),
        (None, Some(p)) => Ok(Resolution::Resolved {
            tenant_id: p,
            source: ResolutionSource::PathPrefix,
        }),
        (None, None) => match subdomain_signal(host, cfg.base_domain.as_deref()) {
            Some(s) => Ok(Resolution::Resolved {
                tenant_id: s,
                source: ResolutionSource::Subdomain,
            }),
            None => Err(ResolveError::UnresolvedTenant),
        },
    }
}

fn header_signal(headers: &HeaderMap, header_name: &str) -> Option<String> {
    let value = headers.get(header_name)?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Extract the tenant label from `<tenantId>.<base_domain>`. Hosts that are
/// not a single label under the base domain carry no signal.
fn subdomain_signal(host: Option<&str>, base_domain: Option<&str>) -> Option<String> {
    let base = base_domain?.to_ascii_lowercase();
    let host = host?.split(':').next()?.trim().to_ascii_lowercase();

    let label = host.strip_suffix(&base)?.strip_suffix('.')?;
    if label.is_empty() || label.contains('.') {
        return None;
    }
    Some(label.to_string())
}

/// Split a tenant-prefixed path `/t/<tenant>/rest` into the tenant id and the
/// remainder path. Returns `None` when the path does not carry the prefix.
pub fn split_path_prefix(path: &str, prefix: &str) -> Option<(String, String)> {
    let rest = path
        .strip_prefix('/')?
        .strip_prefix(prefix)?
        .strip_prefix('/')?;

    let (tenant, remainder) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };

    if tenant.is_empty() {
        return None;
    }

    let remainder = if remainder.is_empty() { "/" } else { remainder };
    Some((tenant.to_string(), remainder.to_string()))
}
