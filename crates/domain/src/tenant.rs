//! Tenant aggregate.

use serde::{Deserialize, Serialize};

use authora_core::{AggregateBase, AggregateRoot, Error, Result, TenantId};

use crate::Metadata;

/// An isolation boundary for roles and assignments. Name is unique
/// service-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    #[serde(flatten)]
    base: AggregateBase,
    name: String,
    #[serde(default)]
    metadata: Metadata,
}

impl Tenant {
    pub fn new(name: impl Into<String>, metadata: Metadata) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("name is required"));
        }

        Ok(Self {
            base: AggregateBase::new(),
            name,
            metadata,
        })
    }

    pub fn id(&self) -> TenantId {
        TenantId::from_uuid(self.base.id())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn update(&mut self, name: Option<String>, metadata: Option<Metadata>) {
        if let Some(name) = name.filter(|v| !v.trim().is_empty()) {
            self.name = name.trim().to_string();
            self.touch();
        }
        if let Some(meta) = metadata {
            self.metadata = meta;
            self.touch();
        }
    }
}

impl AggregateRoot for Tenant {
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
    fn name_is_required() {
        assert!(Tenant::new("  ", Metadata::new()).is_err());
    }

    #[test]
    fn update_touches_on_change() {
        let mut t = Tenant::new("Acme", Metadata::new()).unwrap();
        t.update(Some("Acme Corp".to_string()), None);
        assert_eq!(t.name(), "Acme Corp");
        assert_eq!(t.version(), 1);
    }
}
