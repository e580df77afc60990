use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::context::TenantContext;
use crate::ratelimit::RateLimiter;
use crate::registry::{RegistryError, Tenant, TenantPatch, TenantRegistry, TenantStore};
use crate::theme::ThemeCache;

/// Shared application state: registry, theme cache and rate limiter behind
/// `Arc`s, cloned into every request. Request-scoped identity never lives
/// here; that is `TenantContext`'s job.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<TenantRegistry>,
    pub themes: Arc<ThemeCache>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let registry = TenantRegistry::in_memory();
        Self::build(config, registry)
    }

    /// Wire a custom store, e.g. the real backing store or a failing one in
    /// tests.
    pub fn with_store(config: AppConfig, store: Arc<dyn TenantStore>) -> Self {
        Self::build(config, TenantRegistry::new(store))
    }

    fn build(config: AppConfig, registry: TenantRegistry) -> Self {
        let limiter = RateLimiter::new(
            config.rate.requests_per_window,
            Duration::from_secs(config.rate.window_secs),
        );
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            themes: Arc::new(ThemeCache::new()),
            limiter: Arc::new(limiter),
        }
    }

    /// Admin update flow: registry write first, cache invalidation second,
    /// within the same logical operation. No response built from this result
    /// can reflect the write without the invalidation having happened.
    pub async fn update_tenant(
        &self,
        tenant_id: &str,
        patch: TenantPatch,
        ctx: &TenantContext,
    ) -> Result<Tenant, RegistryError> {
        let tenant = self.registry.update(tenant_id, patch, ctx).await?;
        self.themes.invalidate(tenant_id).await;
        Ok(tenant)
    }
}
