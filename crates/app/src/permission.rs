//! Permission commands and façade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use authora_core::{
    Command, Error, Filter, PermissionId, ReadResult, Repository, Request, Result,
    validation_errors,
};
use authora_domain::Permission;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub resource: String,
    pub action: String,
}

impl Command for CreatePermission {
    fn name(&self) -> &'static str {
        "permission.create.command"
    }

    fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.resource.trim().is_empty() {
            fields.push("resource is required".to_string());
        }
        if self.action.trim().is_empty() {
            fields.push("action is required".to_string());
        }
        validation_errors(fields)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePermission {
    pub id: PermissionId,
    pub resource: Option<String>,
    pub action: Option<String>,
}

impl Command for UpdatePermission {
    fn name(&self) -> &'static str {
        "permission.update.command"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Permission write/read façade. `(resource, action)` is unique.
pub struct PermissionApp {
    permissions: Arc<dyn Repository<Permission>>,
}

impl PermissionApp {
    pub fn new(permissions: Arc<dyn Repository<Permission>>) -> Self {
        Self { permissions }
    }

    pub async fn create(&self, cmd: CreatePermission) -> Result<Permission> {
        let command = cmd.name();
        cmd.validate()?;

        let resource = cmd.resource.trim().to_string();
        let action = cmd.action.trim().to_string();
        let taken = self
            .permissions
            .read_one(&Request::one(vec![
                Filter::eq("resource", resource.clone()),
                Filter::eq("action", action.clone()),
            ]))
            .await?
            .is_some();
        if taken {
            return Err(Error::conflict(format!(
                "permission {resource}:{action} already exists"
            )));
        }

        let permission = Permission::new(resource, action)?;
        self.permissions.create(&permission).await?;
        tracing::info!(command, permission = %permission.id(), "permission created");
        Ok(permission)
    }

    pub async fn update(&self, cmd: UpdatePermission) -> Result<Permission> {
        let command = cmd.name();
        cmd.validate()?;
        let mut permission = self
            .permissions
            .read_one(&Request::one(vec![Filter::eq("id", cmd.id.to_string())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("permission {}", cmd.id)))?;

        let resource = cmd
            .resource
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| permission.resource())
            .to_string();
        let action = cmd
            .action
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| permission.action())
            .to_string();
        if resource != permission.resource() || action != permission.action() {
            let taken = self
                .permissions
                .read_one(&Request::one(vec![
                    Filter::eq("resource", resource.clone()),
                    Filter::eq("action", action.clone()),
                ]))
                .await?
                .is_some();
            if taken {
                return Err(Error::conflict(format!(
                    "permission {resource}:{action} already exists"
                )));
            }
        }

        permission.update(cmd.resource, cmd.action);
        self.permissions.update(&permission).await?;
        tracing::info!(command, permission = %permission.id(), "permission updated");
        Ok(permission)
    }

    pub async fn read(&self, request: &Request) -> Result<ReadResult<Permission>> {
        self.permissions.read(request).await
    }

    pub async fn read_one(&self, request: &Request) -> Result<Option<Permission>> {
        self.permissions.read_one(request).await
    }
}
