//! Permission aggregate.

use serde::{Deserialize, Serialize};

use authora_core::{AggregateBase, AggregateRoot, Error, PermissionId, Result};

/// A `{resource, action}` capability. The pair is unique service-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(flatten)]
    base: AggregateBase,
    resource: String,
    action: String,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Result<Self> {
        let resource = resource.into().trim().to_string();
        let action = action.into().trim().to_string();

        let mut fields = Vec::new();
        if resource.is_empty() {
            fields.push("resource is required".to_string());
        }
        if action.is_empty() {
            fields.push("action is required".to_string());
        }
        if !fields.is_empty() {
            return Err(Error::validation(fields.join("; ")));
        }

        Ok(Self {
            base: AggregateBase::new(),
            resource,
            action,
        })
    }

    pub fn id(&self) -> PermissionId {
        PermissionId::from_uuid(self.base.id())
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn update(&mut self, resource: Option<String>, action: Option<String>) {
        if let Some(resource) = resource.filter(|v| !v.trim().is_empty()) {
            self.resource = resource.trim().to_string();
            self.touch();
        }
        if let Some(action) = action.filter(|v| !v.trim().is_empty()) {
            self.action = action.trim().to_string();
            self.touch();
        }
    }
}

impl AggregateRoot for Permission {
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
    fn resource_and_action_are_required() {
        let err = Permission::new(" ", "").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("resource"));
        assert!(msg.contains("action"));
    }
}
