//! User aggregate.

use serde::{Deserialize, Serialize};

use authora_core::{AggregateBase, AggregateRoot, Error, Result, UserId};

use crate::status::{State, Status};
use crate::Metadata;

/// A user account.
///
/// Email is unique service-wide; the password is stored as an Argon2id PHC
/// hash (hashing itself lives in the auth layer). Deleted is a lifecycle
/// state, not removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    base: AggregateBase,
    given_names: String,
    family_name: String,
    email: String,
    password: String,
    #[serde(default)]
    metadata: Metadata,
    status: Status,
}

impl User {
    /// Create a new user in the `PendingVerification` state.
    ///
    /// `password` must already be hashed by the caller.
    pub fn new(
        given_names: impl Into<String>,
        family_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        metadata: Metadata,
    ) -> Result<Self> {
        let given_names = given_names.into().trim().to_string();
        let family_name = family_name.into().trim().to_string();
        let email = email.into().trim().to_lowercase();
        let password_hash = password_hash.into();

        let mut fields = Vec::new();
        if given_names.is_empty() {
            fields.push("given names are required".to_string());
        }
        if family_name.is_empty() {
            fields.push("family name is required".to_string());
        }
        if email.is_empty() || !email.contains('@') {
            fields.push("a valid email is required".to_string());
        }
        if password_hash.is_empty() {
            fields.push("password is required".to_string());
        }
        if !fields.is_empty() {
            return Err(Error::validation(fields.join("; ")));
        }

        Ok(Self {
            base: AggregateBase::new(),
            given_names,
            family_name,
            email,
            password: password_hash,
            metadata,
            status: Status::pending_verification(),
        })
    }

    pub fn id(&self) -> UserId {
        UserId::from_uuid(self.base.id())
    }

    pub fn given_names(&self) -> &str {
        &self.given_names
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Full display name.
    pub fn name(&self) -> String {
        format!("{} {}", self.given_names, self.family_name)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Partial update: empty/absent fields leave the current value in place.
    pub fn update(
        &mut self,
        given_names: Option<String>,
        family_name: Option<String>,
        metadata: Option<Metadata>,
    ) {
        if let Some(given) = given_names.filter(|v| !v.trim().is_empty()) {
            self.given_names = given.trim().to_string();
            self.touch();
        }
        if let Some(family) = family_name.filter(|v| !v.trim().is_empty()) {
            self.family_name = family.trim().to_string();
            self.touch();
        }
        if let Some(meta) = metadata {
            self.metadata = meta;
            self.touch();
        }
    }

    /// Replace the stored hash. Old-password verification (change-password
    /// path) and purpose-token checks (reset path) happen in the auth/app
    /// layers before this is called.
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) -> Result<()> {
        let hash = password_hash.into();
        if hash.is_empty() {
            return Err(Error::validation("password is required"));
        }
        self.password = hash;
        self.touch();
        Ok(())
    }

    /// Move the lifecycle state machine. Fails without mutation on an
    /// illegal transition.
    pub fn change_status(&mut self, next: State) -> Result<()> {
        self.status.change_state(next)?;
        self.touch();
        Ok(())
    }
}

impl AggregateRoot for User {
    fn base(&self) -> &AggregateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AggregateBase {
        &mut self.base
    }
}
