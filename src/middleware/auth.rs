use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, TokenError};
use crate::error::ApiError;
use crate::state::AppState;

/// Token verification middleware: validates the bearer credential and injects
/// the decoded `Claims` into the request. Runs before the tenant gate.
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers)?;

    let claims = auth::verify_token(
        &token,
        &state.config.security.jwt_secret,
        state.config.security.jwt_leeway_secs,
    )?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header.
fn extract_bearer(headers: &HeaderMap) -> Result<String, TokenError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(TokenError::Missing)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| TokenError::Invalid("Authorization header is not valid UTF-8".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            TokenError::Invalid("Authorization header must use Bearer token format".to_string())
        })?
        .trim();

    if token.is_empty() {
        return Err(TokenError::Missing);
    }

    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            extract_bearer(&HeaderMap::new()),
            Err(TokenError::Missing)
        ));
    }

    #[test]
    fn test_empty_token_is_missing() {
        assert!(matches!(
            extract_bearer(&headers("Bearer   ")),
            Err(TokenError::Missing)
        ));
    }

    #[test]
    fn test_non_bearer_scheme_is_invalid() {
        assert!(matches!(
            extract_bearer(&headers("Basic dXNlcjpwYXNz")),
            Err(TokenError::Invalid(_))
        ));
    }
}
