//! Role commands and façade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use authora_core::{
    Command, Error, Filter, PermissionId, ReadResult, Repository, Request, Result, RoleId,
    TenantId, validation_errors,
};
use authora_domain::{Role, Tenant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub tenant: TenantId,
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
}

impl Command for CreateRole {
    fn name(&self) -> &'static str {
        "role.create.command"
    }

    fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.name.trim().is_empty() {
            fields.push("name is required".to_string());
        }
        validation_errors(fields)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRole {
    pub id: RoleId,
    pub name: Option<String>,
    pub permissions: Option<Vec<PermissionId>>,
}

impl Command for UpdateRole {
    fn name(&self) -> &'static str {
        "role.update.command"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Role write/read façade. `(name, tenant)` is unique per tenant.
pub struct RoleApp {
    roles: Arc<dyn Repository<Role>>,
    tenants: Arc<dyn Repository<Tenant>>,
}

impl RoleApp {
    pub fn new(roles: Arc<dyn Repository<Role>>, tenants: Arc<dyn Repository<Tenant>>) -> Self {
        Self { roles, tenants }
    }

    pub async fn create(&self, cmd: CreateRole) -> Result<Role> {
        let command = cmd.name();
        cmd.validate()?;

        self.tenants
            .read_one(&Request::one(vec![Filter::eq(
                "id",
                cmd.tenant.to_string(),
            )]))
            .await?
            .ok_or_else(|| Error::not_found(format!("tenant {}", cmd.tenant)))?;

        let name = cmd.name.trim().to_string();
        let taken = self
            .roles
            .read_one(&Request::one(vec![
                Filter::eq("name", name.clone()),
                Filter::eq("tenant", cmd.tenant.to_string()),
            ]))
            .await?
            .is_some();
        if taken {
            return Err(Error::conflict(format!(
                "role {name} already exists in tenant {}",
                cmd.tenant
            )));
        }

        let role = Role::new(name, cmd.tenant, cmd.permissions)?;
        self.roles.create(&role).await?;
        tracing::info!(command, role = %role.id(), name = role.name(), "role created");
        Ok(role)
    }

    pub async fn update(&self, cmd: UpdateRole) -> Result<Role> {
        let command = cmd.name();
        cmd.validate()?;
        let mut role = self
            .roles
            .read_one(&Request::one(vec![Filter::eq("id", cmd.id.to_string())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("role {}", cmd.id)))?;

        if let Some(name) = cmd.name.as_deref().map(str::trim) {
            if !name.is_empty() && name != role.name() {
                let taken = self
                    .roles
                    .read_one(&Request::one(vec![
                        Filter::eq("name", name),
                        Filter::eq("tenant", role.tenant().to_string()),
                    ]))
                    .await?
                    .is_some();
                if taken {
                    return Err(Error::conflict(format!(
                        "role {name} already exists in tenant {}",
                        role.tenant()
                    )));
                }
            }
        }

        role.update(cmd.name, cmd.permissions);
        self.roles.update(&role).await?;
        tracing::info!(command, role = %role.id(), "role updated");
        Ok(role)
    }

    pub async fn read(&self, request: &Request) -> Result<ReadResult<Role>> {
        self.roles.read(request).await
    }

    pub async fn read_one(&self, request: &Request) -> Result<Option<Role>> {
        self.roles.read_one(request).await
    }
}

#[cfg(test)]
mod tests {
    use authora_domain::Metadata;
    use authora_infra::InMemoryRepository;

    use super::*;

    async fn app_with_tenant() -> (RoleApp, TenantId) {
        let tenants = Arc::new(InMemoryRepository::new());
        let tenant = Tenant::new("acme", Metadata::new()).unwrap();
        tenants.create(&tenant).await.unwrap();
        (
            RoleApp::new(Arc::new(InMemoryRepository::<Role>::new()), tenants),
            tenant.id(),
        )
    }

    #[tokio::test]
    async fn role_names_are_unique_per_tenant() {
        let (app, tenant) = app_with_tenant().await;
        app.create(CreateRole {
            name: "admin".to_string(),
            tenant,
            permissions: vec![],
        })
        .await
        .unwrap();

        let err = app
            .create(CreateRole {
                name: "admin".to_string(),
                tenant,
                permissions: vec![],
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn rename_onto_an_existing_role_conflicts() {
        let (app, tenant) = app_with_tenant().await;
        app.create(CreateRole {
            name: "admin".to_string(),
            tenant,
            permissions: vec![],
        })
        .await
        .unwrap();
        let viewer = app
            .create(CreateRole {
                name: "viewer".to_string(),
                tenant,
                permissions: vec![],
            })
            .await
            .unwrap();

        let err = app
            .update(UpdateRole {
                id: viewer.id(),
                name: Some("admin".to_string()),
                permissions: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Keeping its own name is not a conflict.
        app.update(UpdateRole {
            id: viewer.id(),
            name: Some("viewer".to_string()),
            permissions: None,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn create_requires_an_existing_tenant() {
        let (app, _) = app_with_tenant().await;
        let err = app
            .create(CreateRole {
                name: "admin".to_string(),
                tenant: TenantId::new(),
                permissions: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
