use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::registry::{RegistryError, TenantRegistry, Theme};

/// Read-through cache in front of the registry's theme data.
///
/// Entries are removed by explicit invalidation on the write path, not by a
/// TTL: the admin update flow calls `TenantRegistry::update` and then
/// `invalidate`, which keeps "save theme, read theme" causally consistent
/// in-process. Fills are serialized per tenant and invalidation takes the
/// same lock, so a fill that loaded a pre-update theme cannot be reinserted
/// after the invalidation that followed the update.
#[derive(Default)]
pub struct ThemeCache {
    entries: DashMap<String, Arc<Theme>>,
    fill_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ThemeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_theme(
        &self,
        registry: &TenantRegistry,
        tenant_id: &str,
    ) -> Result<Arc<Theme>, RegistryError> {
        if let Some(theme) = self.entries.get(tenant_id) {
            return Ok(Arc::clone(&theme));
        }

        let lock = self.fill_lock(tenant_id);
        let _guard = lock.lock().await;

        // Another fill may have landed while waiting for the lock
        if let Some(theme) = self.entries.get(tenant_id) {
            return Ok(Arc::clone(&theme));
        }

        match registry.get(tenant_id).await {
            Ok(tenant) => {
                let theme = Arc::new(tenant.theme);
                self.entries.insert(tenant_id.to_string(), theme.clone());
                Ok(theme)
            }
            // Deliberate fallback, not an error path. Not cached, so a later
            // provisioning of this tenant is observed on the next read.
            Err(RegistryError::NotFound(_)) => Ok(Arc::new(Theme::default())),
            Err(err) => Err(err),
        }
    }

    /// Drop the cached entry so the next read goes through to the registry.
    pub async fn invalidate(&self, tenant_id: &str) {
        let lock = self.fill_lock(tenant_id);
        let _guard = lock.lock().await;
        self.entries.remove(tenant_id);
        tracing::debug!(tenant = tenant_id, "theme cache entry invalidated");
    }

    pub fn is_cached(&self, tenant_id: &str) -> bool {
        self.entries.contains_key(tenant_id)
    }

    fn fill_lock(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        self.fill_locks
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
