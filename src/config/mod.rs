use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub tenancy: TenancyConfig,
    pub security: SecurityConfig,
    pub rate: RateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// How a requested tenant identity is read off the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Trusted header carrying the tenant id, normally injected by the edge gateway.
    pub header_name: String,
    /// First path segment marking a tenant-prefixed URL, e.g. `t` for `/t/acme/...`.
    pub path_prefix: String,
    /// Base domain for subdomain resolution (`acme.example.com`). Subdomain
    /// resolution is disabled when unset.
    pub base_domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// Clock skew tolerance applied during token verification, in seconds.
    pub jwt_leeway_secs: u64,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    pub enabled: bool,
    pub requests_per_window: u32,
    pub window_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Tenancy overrides
        if let Ok(v) = env::var("TENANT_HEADER_NAME") {
            if !v.trim().is_empty() {
                self.tenancy.header_name = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("TENANT_PATH_PREFIX") {
            if !v.trim().is_empty() {
                self.tenancy.path_prefix = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("TENANT_BASE_DOMAIN") {
            let v = v.trim().to_string();
            self.tenancy.base_domain = if v.is_empty() { None } else { Some(v) };
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_LEEWAY_SECS") {
            self.security.jwt_leeway_secs = v.parse().unwrap_or(self.security.jwt_leeway_secs);
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Rate admission overrides
        if let Ok(v) = env::var("RATE_LIMIT_ENABLED") {
            self.rate.enabled = v.parse().unwrap_or(self.rate.enabled);
        }
        if let Ok(v) = env::var("RATE_LIMIT_REQUESTS") {
            self.rate.requests_per_window = v.parse().unwrap_or(self.rate.requests_per_window);
        }
        if let Ok(v) = env::var("RATE_LIMIT_WINDOW_SECS") {
            self.rate.window_secs = v.parse().unwrap_or(self.rate.window_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            tenancy: TenancyConfig {
                header_name: "X-Tenant-Id".to_string(),
                path_prefix: "t".to_string(),
                base_domain: None,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                jwt_leeway_secs: 60,
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            rate: RateConfig {
                enabled: false,
                requests_per_window: 1000,
                window_secs: 60,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            tenancy: TenancyConfig {
                header_name: "X-Tenant-Id".to_string(),
                path_prefix: "t".to_string(),
                base_domain: Some("staging.example.com".to_string()),
            },
            security: SecurityConfig {
                // Must be supplied via SECURITY_JWT_SECRET; verification fails closed otherwise
                jwt_secret: String::new(),
                jwt_leeway_secs: 30,
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            rate: RateConfig {
                enabled: true,
                requests_per_window: 100,
                window_secs: 60,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            tenancy: TenancyConfig {
                header_name: "X-Tenant-Id".to_string(),
                path_prefix: "t".to_string(),
                base_domain: Some("example.com".to_string()),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_leeway_secs: 5,
                jwt_expiry_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            rate: RateConfig {
                enabled: true,
                requests_per_window: 60,
                window_secs: 60,
            },
        }
    }
}
