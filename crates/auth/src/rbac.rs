//! Claims aggregation over assignments, roles, and permissions.

use std::collections::BTreeMap;
use std::sync::Arc;

use authora_core::{Error, Filter, PermissionGrant, Query, Repository, Request, Result, TenantGrant, UserId};
use authora_domain::{Assignment, Permission, Role};

/// Resolves a user's tenant grants at token-issuance time.
///
/// Nothing here is cached or stored: every issuance walks assignments to
/// roles to permissions, so a role edit shows up in the next token minted.
/// Any lookup failure fails the whole resolution.
pub struct RbacResolver {
    assignments: Arc<dyn Repository<Assignment>>,
    roles: Arc<dyn Repository<Role>>,
    permissions: Arc<dyn Repository<Permission>>,
}

impl RbacResolver {
    pub fn new(
        assignments: Arc<dyn Repository<Assignment>>,
        roles: Arc<dyn Repository<Role>>,
        permissions: Arc<dyn Repository<Permission>>,
    ) -> Self {
        Self {
            assignments,
            roles,
            permissions,
        }
    }

    /// Build the tenant-keyed grant map for `user`.
    ///
    /// A user with no assignments resolves to an empty map, which is not an
    /// error; an assignment pointing at a missing role or permission is.
    pub async fn resolve(&self, user: UserId) -> Result<BTreeMap<String, TenantGrant>> {
        let request = Request::new(vec![
            Query::named("assignments").filter(Filter::eq("user", user.to_string())),
        ]);
        let assignments = self.assignments.read(&request).await?.into_facet("assignments");

        let mut tenants = BTreeMap::new();
        for assignment in assignments {
            let role = self
                .roles
                .read_one(&Request::one(vec![Filter::eq(
                    "id",
                    assignment.role().to_string(),
                )]))
                .await?
                .ok_or_else(|| Error::not_found(format!("role {}", assignment.role())))?;

            let mut grants = Vec::with_capacity(role.permissions().len());
            for permission_id in role.permissions() {
                let permission = self
                    .permissions
                    .read_one(&Request::one(vec![Filter::eq(
                        "id",
                        permission_id.to_string(),
                    )]))
                    .await?
                    .ok_or_else(|| Error::not_found(format!("permission {permission_id}")))?;
                grants.push(PermissionGrant::new(
                    permission.resource(),
                    permission.action(),
                ));
            }

            tenants.insert(
                assignment.tenant().to_string(),
                TenantGrant {
                    role: role.id().to_string(),
                    tenant: role.tenant().to_string(),
                    permissions: grants,
                },
            );
        }

        Ok(tenants)
    }
}
