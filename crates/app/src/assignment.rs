//! Assignment commands and façade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use authora_core::{
    AssignmentId, Command, Error, Filter, ReadResult, Repository, Request, Result, RoleId,
    TenantId, UserId,
};
use authora_domain::{Assignment, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignment {
    pub user: UserId,
    pub tenant: TenantId,
    pub role: RoleId,
}

impl Command for CreateAssignment {
    fn name(&self) -> &'static str {
        "assignment.create.command"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAssignment {
    pub id: AssignmentId,
    pub role: RoleId,
}

impl Command for UpdateAssignment {
    fn name(&self) -> &'static str {
        "assignment.update.command"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Assignment write/read façade.
///
/// One role per user per tenant. The administrative path and the
/// `user_created` consumer both funnel through [`AssignmentApp::create`], so
/// a redelivered event surfaces as a conflict the consumer treats as done.
pub struct AssignmentApp {
    assignments: Arc<dyn Repository<Assignment>>,
    roles: Arc<dyn Repository<Role>>,
}

impl AssignmentApp {
    pub fn new(
        assignments: Arc<dyn Repository<Assignment>>,
        roles: Arc<dyn Repository<Role>>,
    ) -> Self {
        Self { assignments, roles }
    }

    pub async fn create(&self, cmd: CreateAssignment) -> Result<Assignment> {
        let command = cmd.name();
        cmd.validate()?;

        self.get_role(cmd.role).await?;

        let taken = self
            .assignments
            .read_one(&Request::one(vec![
                Filter::eq("user", cmd.user.to_string()),
                Filter::eq("tenant", cmd.tenant.to_string()),
            ]))
            .await?
            .is_some();
        if taken {
            return Err(Error::conflict(format!(
                "user {} already holds a role in tenant {}",
                cmd.user, cmd.tenant
            )));
        }

        let assignment = Assignment::new(cmd.user, cmd.tenant, cmd.role);
        self.assignments.create(&assignment).await?;
        tracing::info!(
            command,
            assignment = %assignment.id(),
            user = %cmd.user,
            tenant = %cmd.tenant,
            "assignment created"
        );
        Ok(assignment)
    }

    pub async fn update(&self, cmd: UpdateAssignment) -> Result<Assignment> {
        let command = cmd.name();
        cmd.validate()?;

        self.get_role(cmd.role).await?;

        let mut assignment = self
            .assignments
            .read_one(&Request::one(vec![Filter::eq("id", cmd.id.to_string())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("assignment {}", cmd.id)))?;

        assignment.change_role(cmd.role);
        self.assignments.update(&assignment).await?;
        tracing::info!(command, assignment = %assignment.id(), "assignment updated");
        Ok(assignment)
    }

    pub async fn read(&self, request: &Request) -> Result<ReadResult<Assignment>> {
        self.assignments.read(request).await
    }

    pub async fn read_one(&self, request: &Request) -> Result<Option<Assignment>> {
        self.assignments.read_one(request).await
    }

    async fn get_role(&self, role: RoleId) -> Result<Role> {
        self.roles
            .read_one(&Request::one(vec![Filter::eq("id", role.to_string())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("role {role}")))
    }
}

#[cfg(test)]
mod tests {
    use authora_domain::Metadata;
    use authora_infra::InMemoryRepository;

    use super::*;

    async fn app_with_role() -> (AssignmentApp, TenantId, RoleId) {
        let roles = Arc::new(InMemoryRepository::new());
        let tenant = authora_domain::Tenant::new("acme", Metadata::new()).unwrap();
        let role = Role::new("member", tenant.id(), vec![]).unwrap();
        roles.create(&role).await.unwrap();
        (
            AssignmentApp::new(Arc::new(InMemoryRepository::<Assignment>::new()), roles),
            tenant.id(),
            role.id(),
        )
    }

    #[tokio::test]
    async fn one_role_per_user_per_tenant() {
        let (app, tenant, role) = app_with_role().await;
        let user = UserId::new();

        app.create(CreateAssignment { user, tenant, role }).await.unwrap();
        let err = app
            .create(CreateAssignment { user, tenant, role })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn create_requires_an_existing_role() {
        let (app, tenant, _) = app_with_role().await;
        let err = app
            .create(CreateAssignment {
                user: UserId::new(),
                tenant,
                role: RoleId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn update_repoints_the_role() {
        let (app, tenant, role) = app_with_role().await;
        let other = Role::new("viewer", tenant, vec![]).unwrap();
        app.roles.create(&other).await.unwrap();

        let assignment = app
            .create(CreateAssignment {
                user: UserId::new(),
                tenant,
                role,
            })
            .await
            .unwrap();
        let updated = app
            .update(UpdateAssignment {
                id: assignment.id(),
                role: other.id(),
            })
            .await
            .unwrap();
        assert_eq!(updated.role(), other.id());
    }
}
