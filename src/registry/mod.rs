pub mod models;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::context::TenantContext;
pub use models::{FeatureFlag, Tenant, TenantPatch, Theme, ThemeColors, ThemePatch, Typography};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tenant '{0}' not found")]
    NotFound(String),
    #[error("Context tenant '{context}' may not modify tenant '{target}'")]
    IsolationViolation { context: String, target: String },
    #[error("Unknown setting key: {0}")]
    UnknownSetting(String),
    #[error("Tenant store unavailable: {0}")]
    Unavailable(String),
    #[error("Version conflict updating tenant '{0}'")]
    VersionConflict(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("record revision did not match")]
    VersionConflict,
}

/// Narrow contract over the external tenant store. The persistence engine
/// itself is a collaborator; only find-by-id and update-with-version-check
/// cross this boundary.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_by_id(&self, tenant_id: &str) -> Result<Option<Tenant>, StoreError>;

    /// Replace the record if its current revision matches `expected_revision`.
    async fn update_by_id(
        &self,
        tenant_id: &str,
        expected_revision: u64,
        tenant: Tenant,
    ) -> Result<Tenant, StoreError>;

    async fn insert(&self, tenant: Tenant) -> Result<(), StoreError>;
}

/// In-memory store used for tests and single-node deployments.
#[derive(Default)]
pub struct MemoryStore {
    tenants: DashMap<String, Tenant>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_by_id(&self, tenant_id: &str) -> Result<Option<Tenant>, StoreError> {
        Ok(self.tenants.get(tenant_id).map(|t| t.clone()))
    }

    async fn update_by_id(
        &self,
        tenant_id: &str,
        expected_revision: u64,
        tenant: Tenant,
    ) -> Result<Tenant, StoreError> {
        match self.tenants.get_mut(tenant_id) {
            Some(mut entry) if entry.revision == expected_revision => {
                *entry = tenant.clone();
                Ok(tenant)
            }
            Some(_) | None => Err(StoreError::VersionConflict),
        }
    }

    async fn insert(&self, tenant: Tenant) -> Result<(), StoreError> {
        self.tenants.insert(tenant.tenant_id.clone(), tenant);
        Ok(())
    }
}

/// Registry of canonical tenant records.
///
/// Reads go straight to the store and run concurrently. Updates are
/// serialized per tenant (no ordering across tenants) and the registry
/// re-asserts the caller's tenant identity itself instead of trusting the
/// handler that already checked it.
pub struct TenantRegistry {
    store: Arc<dyn TenantStore>,
    update_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TenantRegistry {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self {
            store,
            update_locks: DashMap::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn get(&self, tenant_id: &str) -> Result<Tenant, RegistryError> {
        match self.store.find_by_id(tenant_id).await {
            Ok(Some(tenant)) => Ok(tenant),
            Ok(None) => Err(RegistryError::NotFound(tenant_id.to_string())),
            Err(StoreError::Unavailable(msg)) => Err(RegistryError::Unavailable(msg)),
            Err(StoreError::VersionConflict) => {
                Err(RegistryError::VersionConflict(tenant_id.to_string()))
            }
        }
    }

    /// Register a tenant at provisioning time.
    pub async fn insert(&self, tenant: Tenant) -> Result<(), RegistryError> {
        self.store.insert(tenant).await.map_err(|e| match e {
            StoreError::Unavailable(msg) => RegistryError::Unavailable(msg),
            StoreError::VersionConflict => {
                RegistryError::Unavailable("version conflict on insert".to_string())
            }
        })
    }

    /// Apply an admin patch to a tenant record.
    ///
    /// The whole patch lands atomically: the record is rebuilt under the
    /// per-tenant lock and swapped in with a revision check, so a concurrent
    /// reader sees either the old record or the new one, never a blend.
    pub async fn update(
        &self,
        tenant_id: &str,
        patch: TenantPatch,
        ctx: &TenantContext,
    ) -> Result<Tenant, RegistryError> {
        if ctx.tenant_id() != tenant_id {
            tracing::warn!(
                context_tenant = ctx.tenant_id(),
                target_tenant = tenant_id,
                "rejected cross-tenant registry update"
            );
            return Err(RegistryError::IsolationViolation {
                context: ctx.tenant_id().to_string(),
                target: tenant_id.to_string(),
            });
        }

        // Validate before taking the lock; nothing is applied on failure
        let settings = match &patch.settings {
            Some(raw) => {
                let mut validated = Vec::with_capacity(raw.len());
                for (key, value) in raw {
                    let flag = FeatureFlag::from_str(key)
                        .map_err(|_| RegistryError::UnknownSetting(key.clone()))?;
                    validated.push((flag, *value));
                }
                Some(validated)
            }
            None => None,
        };

        let lock = self
            .update_locks
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let current = self.get(tenant_id).await?;
        let mut next = current.clone();

        if let Some(name) = patch.display_name {
            next.display_name = name;
        }
        if let Some(theme_patch) = &patch.theme {
            next.theme = next.theme.apply(theme_patch);
        }
        if let Some(flags) = settings {
            for (flag, value) in flags {
                next.settings.insert(flag, value);
            }
        }
        next.revision = current.revision + 1;

        match self
            .store
            .update_by_id(tenant_id, current.revision, next)
            .await
        {
            Ok(tenant) => {
                tracing::debug!(tenant = tenant_id, revision = tenant.revision, "tenant updated");
                Ok(tenant)
            }
            // The per-tenant lock covers this registry; a revision miss means
            // an out-of-band writer touched the store
            Err(StoreError::VersionConflict) => {
                Err(RegistryError::VersionConflict(tenant_id.to_string()))
            }
            Err(StoreError::Unavailable(msg)) => Err(RegistryError::Unavailable(msg)),
        }
    }
}
