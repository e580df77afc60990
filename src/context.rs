use std::collections::BTreeSet;

use uuid::Uuid;

use crate::resolver::ResolutionSource;

/// Per-request record of which tenant the request is authorized to act as.
///
/// Constructed exactly once by the isolation gate after the claimed and
/// resolved tenant identities have been reconciled, then attached to the
/// request's extensions. Fields are private and there are no setters:
/// downstream code reads the tenant key from here and nowhere else, so a
/// re-resolution mid-request cannot drift from the enforced identity.
#[derive(Debug, Clone)]
pub struct TenantContext {
    tenant_id: String,
    source: ResolutionSource,
    user_id: Uuid,
    roles: BTreeSet<String>,
}

impl TenantContext {
    pub fn new(
        tenant_id: String,
        source: ResolutionSource,
        user_id: Uuid,
        roles: BTreeSet<String>,
    ) -> Self {
        Self {
            tenant_id,
            source,
            user_id,
            roles,
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_lookup() {
        let ctx = TenantContext::new(
            "acme".to_string(),
            ResolutionSource::Header,
            Uuid::new_v4(),
            ["admin".to_string(), "viewer".to_string()].into(),
        );
        assert_eq!(ctx.tenant_id(), "acme");
        assert!(ctx.has_role("admin"));
        assert!(!ctx.has_role("owner"));
    }
}
