#![allow(dead_code)]

use std::convert::Infallible;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::util::BoxCloneSyncService;
use tower::{Layer, ServiceExt};
use uuid::Uuid;

use tenant_gate::auth::{self, Claims};
use tenant_gate::config::AppConfig;
use tenant_gate::middleware::strip_tenant_prefix;
use tenant_gate::registry::Tenant;
use tenant_gate::server;
use tenant_gate::state::AppState;

pub type App = BoxCloneSyncService<Request<Body>, axum::response::Response, Infallible>;

/// Development profile with subdomain resolution enabled for example.com.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.tenancy.base_domain = Some("example.com".to_string());
    config
}

/// App state seeded with the two tenants the tests play off each other.
pub async fn build_state(config: AppConfig) -> AppState {
    let state = AppState::new(config);
    state
        .registry
        .insert(Tenant::new("acme", "Acme Corp"))
        .await
        .expect("seed acme");
    state
        .registry
        .insert(Tenant::new("globex", "Globex Inc"))
        .await
        .expect("seed globex");
    state
}

/// The full service as it runs in production: prefix stripping wrapped
/// around the router, ahead of routing.
pub fn app(state: &AppState) -> App {
    let router = server::router(state.clone());
    BoxCloneSyncService::new(
        axum::middleware::from_fn_with_state(state.clone(), strip_tenant_prefix).layer(router),
    )
}

pub fn token_for(state: &AppState, tenant: &str, roles: &[&str]) -> String {
    let claims = Claims::new(
        Uuid::new_v4(),
        tenant,
        roles.iter().map(|r| r.to_string()).collect(),
        1,
    );
    auth::issue_token(&claims, &state.config.security.jwt_secret).expect("mint token")
}

pub fn expired_token_for(state: &AppState, tenant: &str) -> String {
    let mut claims = Claims::new(Uuid::new_v4(), tenant, vec![], 1);
    claims.iat = chrono::Utc::now().timestamp() - 14_400;
    claims.exp = chrono::Utc::now().timestamp() - 7_200;
    auth::issue_token(&claims, &state.config.security.jwt_secret).expect("mint token")
}

/// Run one request through the service and decode the JSON body.
pub async fn send(app: &App, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

pub struct RequestSpec<'a> {
    pub uri: &'a str,
    pub token: Option<&'a str>,
    pub tenant_header: Option<&'a str>,
    pub host: Option<&'a str>,
}

impl<'a> RequestSpec<'a> {
    pub fn get(uri: &'a str) -> Self {
        Self {
            uri,
            token: None,
            tenant_header: None,
            host: None,
        }
    }

    pub fn token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }

    pub fn tenant_header(mut self, tenant: &'a str) -> Self {
        self.tenant_header = Some(tenant);
        self
    }

    pub fn host(mut self, host: &'a str) -> Self {
        self.host = Some(host);
        self
    }

    pub fn build(self) -> Request<Body> {
        self.build_with(|b| b.body(Body::empty()).expect("request"))
    }

    pub fn build_put_json(self, body: &Value) -> Request<Body> {
        let payload = body.to_string();
        self.build_with(|b| {
            b.method("PUT")
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .expect("request")
        })
    }

    fn build_with(
        self,
        finish: impl FnOnce(axum::http::request::Builder) -> Request<Body>,
    ) -> Request<Body> {
        let mut builder = Request::builder().uri(self.uri);
        if let Some(token) = self.token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        if let Some(tenant) = self.tenant_header {
            builder = builder.header("X-Tenant-Id", tenant);
        }
        if let Some(host) = self.host {
            builder = builder.header("host", host);
        }
        finish(builder)
    }
}
