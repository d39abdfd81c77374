//! Assignment aggregate.

use serde::{Deserialize, Serialize};

use authora_core::{AggregateBase, AggregateRoot, AssignmentId, RoleId, TenantId, UserId};

/// The binding of one role to one user within one tenant.
///
/// `(user, tenant)` is unique: one role per user per tenant. Both the
/// administrative create path and the saga consumer funnel through the same
/// uniqueness check in the application layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(flatten)]
    base: AggregateBase,
    user: UserId,
    tenant: TenantId,
    role: RoleId,
}

impl Assignment {
    pub fn new(user: UserId, tenant: TenantId, role: RoleId) -> Self {
        Self {
            base: AggregateBase::new(),
            user,
            tenant,
            role,
        }
    }

    pub fn id(&self) -> AssignmentId {
        AssignmentId::from_uuid(self.base.id())
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    pub fn role(&self) -> RoleId {
        self.role
    }

    /// Re-point the assignment at a different role within the same tenant.
    pub fn change_role(&mut self, role: RoleId) {
        if self.role != role {
            self.role = role;
            self.touch();
        }
    }
}

impl AggregateRoot for Assignment {
    fn base(&self) -> &AggregateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AggregateBase {
        &mut self.base
    }
}
