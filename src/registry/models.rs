use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Canonical tenant record. Every field lives under the tenant's own key;
/// mutation happens only through `TenantRegistry::update`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tenant {
    pub tenant_id: String,
    pub display_name: String,
    pub theme: Theme,
    pub settings: BTreeMap<FeatureFlag, bool>,
    pub created_at: DateTime<Utc>,
    /// Record revision used for the store's optimistic version check.
    /// Bumped on every update; distinct from `theme.version`.
    pub revision: u64,
}

impl Tenant {
    pub fn new(tenant_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            display_name: display_name.into(),
            theme: Theme::default(),
            settings: BTreeMap::new(),
            created_at: Utc::now(),
            revision: 0,
        }
    }
}

/// Recognized per-tenant feature flags. A closed set: patches carrying any
/// other key are rejected rather than silently ignored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    /// Tenant may replace the default theme with its own branding.
    CustomBranding,
    /// Tenant may mint API tokens for machine access.
    ApiAccess,
    /// Admin operations for this tenant are written to the audit log.
    AuditLog,
    /// Tenant is opted into pre-release features.
    BetaFeatures,
}

impl FeatureFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::CustomBranding => "custom_branding",
            FeatureFlag::ApiAccess => "api_access",
            FeatureFlag::AuditLog => "audit_log",
            FeatureFlag::BetaFeatures => "beta_features",
        }
    }
}

impl FromStr for FeatureFlag {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "custom_branding" => Ok(FeatureFlag::CustomBranding),
            "api_access" => Ok(FeatureFlag::ApiAccess),
            "audit_log" => Ok(FeatureFlag::AuditLog),
            "beta_features" => Ok(FeatureFlag::BetaFeatures),
            _ => Err(UnknownFlag(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown feature flag: {0}")]
pub struct UnknownFlag(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThemeColors {
    pub primary: String,
    pub accent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Typography {
    pub font_family: String,
    pub base_size_px: u16,
}

/// Tenant branding. A patch replaces the whole value atomically and bumps
/// `version` by exactly one; readers never observe a partial update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    pub version: u64,
    pub colors: ThemeColors,
    pub logo_url: Option<String>,
    pub typography: Typography,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            version: 0,
            colors: ThemeColors {
                primary: "#1f2937".to_string(),
                accent: "#3b82f6".to_string(),
            },
            logo_url: None,
            typography: Typography {
                font_family: "Inter, sans-serif".to_string(),
                base_size_px: 16,
            },
        }
    }
}

impl Theme {
    /// Produce the next theme version with the patch applied.
    pub fn apply(&self, patch: &ThemePatch) -> Theme {
        Theme {
            version: self.version + 1,
            colors: patch.colors.clone().unwrap_or_else(|| self.colors.clone()),
            logo_url: match &patch.logo_url {
                Some(url) => Some(url.clone()),
                None => self.logo_url.clone(),
            },
            typography: patch
                .typography
                .clone()
                .unwrap_or_else(|| self.typography.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemePatch {
    pub colors: Option<ThemeColors>,
    pub logo_url: Option<String>,
    pub typography: Option<Typography>,
}

/// Admin update payload. Settings keys arrive as raw strings and are
/// validated against `FeatureFlag` before anything is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantPatch {
    pub display_name: Option<String>,
    pub theme: Option<ThemePatch>,
    pub settings: Option<BTreeMap<String, bool>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_patch_bumps_version_once() {
        let theme = Theme::default();
        let patched = theme.apply(&ThemePatch {
            colors: Some(ThemeColors {
                primary: "#000000".to_string(),
                accent: "#ff0000".to_string(),
            }),
            ..ThemePatch::default()
        });
        assert_eq!(patched.version, theme.version + 1);
        assert_eq!(patched.colors.primary, "#000000");
        // Untouched fields carry over
        assert_eq!(patched.typography, theme.typography);
    }

    #[test]
    fn test_feature_flag_round_trip() {
        for flag in [
            FeatureFlag::CustomBranding,
            FeatureFlag::ApiAccess,
            FeatureFlag::AuditLog,
            FeatureFlag::BetaFeatures,
        ] {
            assert_eq!(flag.as_str().parse::<FeatureFlag>().unwrap(), flag);
        }
        assert!("dark_mode".parse::<FeatureFlag>().is_err());
    }

    #[test]
    fn test_settings_serialize_with_string_keys() {
        let mut tenant = Tenant::new("acme", "Acme Corp");
        tenant.settings.insert(FeatureFlag::ApiAccess, true);
        let value = serde_json::to_value(&tenant).unwrap();
        assert_eq!(value["settings"]["api_access"], true);
    }
}
