// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::resolver::ResolutionSource;

/// Request-terminal error with a stable machine-readable code, so clients and
/// tests can distinguish resolution failures from authorization failures from
/// throttling. Every variant maps to exactly one HTTP status and code.
#[derive(Debug)]
pub enum ApiError {
    // 401 Unauthorized (auth layer)
    MissingToken,
    InvalidToken(String),
    ExpiredToken,

    // 400 Bad Request (resolution layer)
    UnresolvedTenant,
    ConflictingTenantSignal {
        signals: Vec<(ResolutionSource, String)>,
    },

    // 403 Forbidden (isolation layer, fail-closed)
    TenantMismatch {
        claimed: String,
        resolved: String,
    },
    UnknownTenant(String),

    // 429 Too Many Requests (admission layer)
    RateLimitExceeded {
        retry_after_secs: u64,
    },

    // 503 Service Unavailable (internal dependency faults, retryable)
    DependencyUnavailable(String),

    // Handler plumbing
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    Forbidden(String),
    NotFound(String),
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingToken | ApiError::InvalidToken(_) | ApiError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::UnresolvedTenant | ApiError::ConflictingTenantSignal { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::TenantMismatch { .. } | ApiError::UnknownTenant(_) => StatusCode::FORBIDDEN,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) | ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::MissingToken => "Missing bearer credential".to_string(),
            ApiError::InvalidToken(msg) => format!("Invalid token: {}", msg),
            ApiError::ExpiredToken => "Token has expired".to_string(),
            ApiError::UnresolvedTenant => "No tenant signal present on the request".to_string(),
            ApiError::ConflictingTenantSignal { signals } => {
                let parts: Vec<String> = signals
                    .iter()
                    .map(|(source, tenant)| format!("{}={}", source.as_str(), tenant))
                    .collect();
                format!("Tenant signals disagree: {}", parts.join(", "))
            }
            ApiError::TenantMismatch { claimed, resolved } => format!(
                "Token is issued for tenant '{}' but the request targets tenant '{}'",
                claimed, resolved
            ),
            ApiError::UnknownTenant(tenant) => {
                format!("Tenant '{}' is not registered", tenant)
            }
            ApiError::RateLimitExceeded { retry_after_secs } => format!(
                "Request ceiling reached for this tenant, retry after {}s",
                retry_after_secs
            ),
            ApiError::DependencyUnavailable(msg) => {
                format!("Dependency unavailable: {}", msg)
            }
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg) => msg.clone(),
            ApiError::ValidationError { message, .. } => message.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingToken => "MISSING_TOKEN",
            ApiError::InvalidToken(_) => "INVALID_TOKEN",
            ApiError::ExpiredToken => "EXPIRED_TOKEN",
            ApiError::UnresolvedTenant => "UNRESOLVED_TENANT",
            ApiError::ConflictingTenantSignal { .. } => "CONFLICTING_TENANT_SIGNAL",
            ApiError::TenantMismatch { .. } => "TENANT_MISMATCH",
            ApiError::UnknownTenant(_) => "UNKNOWN_TENANT",
            ApiError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            ApiError::DependencyUnavailable(_) => "DEPENDENCY_UNAVAILABLE",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code(),
        });

        match self {
            ApiError::ConflictingTenantSignal { signals } => {
                body["signals"] = signals
                    .iter()
                    .map(|(source, tenant)| {
                        json!({ "source": source.as_str(), "tenant_id": tenant })
                    })
                    .collect();
            }
            ApiError::RateLimitExceeded { retry_after_secs } => {
                body["retry_after_secs"] = json!(retry_after_secs);
            }
            ApiError::ValidationError {
                field_errors: Some(field_errors),
                ..
            } => {
                body["field_errors"] = json!(field_errors);
            }
            _ => {}
        }

        body
    }
}

// Static constructor methods for the plumbing variants
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert module-level error types to ApiError
impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        match err {
            crate::auth::TokenError::Missing => ApiError::MissingToken,
            crate::auth::TokenError::Invalid(msg) => ApiError::InvalidToken(msg),
            crate::auth::TokenError::Expired => ApiError::ExpiredToken,
        }
    }
}

impl From<crate::resolver::ResolveError> for ApiError {
    fn from(err: crate::resolver::ResolveError) -> Self {
        match err {
            crate::resolver::ResolveError::UnresolvedTenant => ApiError::UnresolvedTenant,
        }
    }
}

impl From<crate::registry::RegistryError> for ApiError {
    fn from(err: crate::registry::RegistryError) -> Self {
        match err {
            crate::registry::RegistryError::NotFound(tenant) => ApiError::UnknownTenant(tenant),
            crate::registry::RegistryError::IsolationViolation { context, target } => {
                ApiError::TenantMismatch {
                    claimed: context,
                    resolved: target,
                }
            }
            crate::registry::RegistryError::UnknownSetting(key) => {
                let mut field_errors = HashMap::new();
                field_errors.insert(key.clone(), "Unrecognized feature flag".to_string());
                ApiError::validation_error(
                    format!("Unknown setting key: {}", key),
                    Some(field_errors),
                )
            }
            crate::registry::RegistryError::Unavailable(msg) => {
                tracing::error!("Tenant store unavailable: {}", msg);
                ApiError::DependencyUnavailable(msg)
            }
            crate::registry::RegistryError::VersionConflict(tenant) => {
                // Out-of-band write raced this update; the caller retries
                ApiError::DependencyUnavailable(format!(
                    "Concurrent update to tenant '{}'",
                    tenant
                ))
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let mut response = (status, Json(self.to_json())).into_response();

        if let ApiError::RateLimitExceeded { retry_after_secs } = self {
            if let Ok(value) = retry_after_secs.to_string().parse() {
                response
                    .headers_mut()
                    .insert(axum::http::header::RETRY_AFTER, value);
            }
        }

        response
    }
}
