//! Decoded token claims and the pure predicates evaluated over them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a token was issued for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Purpose,
    Access,
    Refresh,
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenKind::Purpose => f.write_str("purpose"),
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// A single `{resource, action}` grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub resource: String,
    pub action: String,
}

impl PermissionGrant {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }
}

/// The role and permissions a subject holds within one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantGrant {
    /// Role identifier, in string form.
    pub role: String,
    /// Tenant identifier, in string form.
    pub tenant: String,
    pub permissions: Vec<PermissionGrant>,
}

/// Decoded token payload.
///
/// Claims are derived, never stored: the RBAC resolver rebuilds the tenant
/// map on every issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, or `"<user>:<purpose>"` for purpose tokens.
    pub sub: String,
    pub kind: TokenKind,
    pub tenants: BTreeMap<String, TenantGrant>,
    pub iss: String,
    pub jti: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Does the subject hold `role` within `tenant`? Pure, no I/O.
    pub fn has_role(&self, tenant: &str, role: &str) -> bool {
        self.tenants.get(tenant).is_some_and(|g| g.role == role)
    }

    /// Does the subject hold `{resource, action}` within `tenant`?
    /// Linear scan over the tenant's grant list.
    pub fn has_permission(&self, tenant: &str, resource: &str, action: &str) -> bool {
        self.tenants.get(tenant).is_some_and(|g| {
            g.permissions
                .iter()
                .any(|p| p.resource == resource && p.action == action)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        let mut tenants = BTreeMap::new();
        tenants.insert(
            "acme".to_string(),
            TenantGrant {
                role: "admin".to_string(),
                tenant: "acme".to_string(),
                permissions: vec![PermissionGrant::new("billing", "read")],
            },
        );
        Claims {
            sub: "user-1".to_string(),
            kind: TokenKind::Access,
            tenants,
            iss: "authora".to_string(),
            jti: "jti-1".to_string(),
            issued_at: Utc::now(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn role_lookup_is_tenant_scoped() {
        let c = claims();
        assert!(c.has_role("acme", "admin"));
        assert!(!c.has_role("other", "admin"));
        assert!(!c.has_role("acme", "viewer"));
    }

    #[test]
    fn permission_lookup_scans_grants() {
        let c = claims();
        assert!(c.has_permission("acme", "billing", "read"));
        assert!(!c.has_permission("acme", "billing", "write"));
        assert!(!c.has_permission("other", "billing", "read"));
    }
}
