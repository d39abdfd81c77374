//! Role aggregate.

use serde::{Deserialize, Serialize};

use authora_core::{AggregateBase, AggregateRoot, Error, PermissionId, Result, RoleId, TenantId};

/// A named, tenant-scoped bundle of permission references.
///
/// `(name, tenant)` is unique. Permission ids are not checked at write time;
/// they are resolved lazily during claims aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(flatten)]
    base: AggregateBase,
    name: String,
    tenant: TenantId,
    permissions: Vec<PermissionId>,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        tenant: TenantId,
        permissions: Vec<PermissionId>,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("name is required"));
        }

        Ok(Self {
            base: AggregateBase::new(),
            name,
            tenant,
            permissions,
        })
    }

    pub fn id(&self) -> RoleId {
        RoleId::from_uuid(self.base.id())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    pub fn permissions(&self) -> &[PermissionId] {
        &self.permissions
    }

    pub fn update(&mut self, name: Option<String>, permissions: Option<Vec<PermissionId>>) {
        if let Some(name) = name.filter(|v| !v.trim().is_empty()) {
            self.name = name.trim().to_string();
            self.touch();
        }
        if let Some(perms) = permissions {
            self.permissions = perms;
            self.touch();
        }
    }
}

impl AggregateRoot for Role {
    fn base(&self) -> &AggregateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AggregateBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_list_can_be_replaced() {
        let mut role = Role::new("admin", TenantId::new(), vec![]).unwrap();
        let p = PermissionId::new();
        role.update(None, Some(vec![p]));
        assert_eq!(role.permissions(), &[p]);
        assert_eq!(role.version(), 1);
    }
}
