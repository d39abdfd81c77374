//! Tenant commands and façade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use authora_core::{
    Command, Error, Filter, ReadResult, Repository, Request, Result, TenantId, validation_errors,
};
use authora_domain::{Metadata, Tenant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Command for CreateTenant {
    fn name(&self) -> &'static str {
        "tenant.create.command"
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
pub struct UpdateTenant {
    pub id: TenantId,
    pub name: Option<String>,
    pub metadata: Option<Metadata>,
}

impl Command for UpdateTenant {
    fn name(&self) -> &'static str {
        "tenant.update.command"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Tenant write/read façade. The admin create path and the onboarding
/// consumer both land here, so uniqueness doubles as replay idempotency.
pub struct TenantApp {
    tenants: Arc<dyn Repository<Tenant>>,
}

impl TenantApp {
    pub fn new(tenants: Arc<dyn Repository<Tenant>>) -> Self {
        Self { tenants }
    }

    pub async fn create(&self, cmd: CreateTenant) -> Result<Tenant> {
        let command = cmd.name();
        cmd.validate()?;

        let name = cmd.name.trim().to_string();
        if self
            .tenants
            .read_one(&Request::one(vec![Filter::eq("name", name.clone())]))
            .await?
            .is_some()
        {
            return Err(Error::conflict(format!("tenant {name} already exists")));
        }

        let tenant = Tenant::new(name, cmd.metadata)?;
        self.tenants.create(&tenant).await?;
        tracing::info!(command, tenant = %tenant.id(), name = tenant.name(), "tenant created");
        Ok(tenant)
    }

    pub async fn update(&self, cmd: UpdateTenant) -> Result<Tenant> {
        let command = cmd.name();
        cmd.validate()?;
        let mut tenant = self
            .tenants
            .read_one(&Request::one(vec![Filter::eq("id", cmd.id.to_string())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("tenant {}", cmd.id)))?;

        if let Some(name) = cmd.name.as_deref().map(str::trim) {
            if !name.is_empty() && name != tenant.name() {
                let taken = self
                    .tenants
                    .read_one(&Request::one(vec![Filter::eq("name", name)]))
                    .await?
                    .is_some();
                if taken {
                    return Err(Error::conflict(format!("tenant {name} already exists")));
                }
            }
        }

        tenant.update(cmd.name, cmd.metadata);
        self.tenants.update(&tenant).await?;
        tracing::info!(command, tenant = %tenant.id(), "tenant updated");
        Ok(tenant)
    }

    pub async fn read(&self, request: &Request) -> Result<ReadResult<Tenant>> {
        self.tenants.read(request).await
    }

    pub async fn read_one(&self, request: &Request) -> Result<Option<Tenant>> {
        self.tenants.read_one(request).await
    }
}

#[cfg(test)]
mod tests {
    use authora_infra::InMemoryRepository;

    use super::*;

    fn app() -> TenantApp {
        TenantApp::new(Arc::new(InMemoryRepository::<Tenant>::new()))
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let app = app();
        app.create(CreateTenant {
            name: "acme".to_string(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();

        let err = app
            .create(CreateTenant {
                name: " acme ".to_string(),
                metadata: Metadata::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn rename_onto_an_existing_tenant_conflicts() {
        let app = app();
        app.create(CreateTenant {
            name: "acme".to_string(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();
        let other = app
            .create(CreateTenant {
                name: "globex".to_string(),
                metadata: Metadata::new(),
            })
            .await
            .unwrap();

        let err = app
            .update(UpdateTenant {
                id: other.id(),
                name: Some("acme".to_string()),
                metadata: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
