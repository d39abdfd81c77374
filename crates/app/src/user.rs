//! User commands and façade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use authora_auth::{hash_password, verify_password};
use authora_core::{
    AggregateRoot, Command, DomainEvent, Error, Filter, ReadResult, Repository, Request, Result,
    RoleId, TenantId, TokenKind, TokenManager, UserId, validation_errors,
};
use authora_domain::{Metadata, Role, State, Tenant, User};
use authora_events::{Bus, Envelope, EventPayload, UserChangeState, UserCreated};

/// Minimum accepted password length, in characters.
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub given_names: String,
    pub family_name: String,
    pub email: String,
    pub password: String,
    pub role: RoleId,
    pub tenant: TenantId,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Command for CreateUser {
    fn name(&self) -> &'static str {
        "user.create.command"
    }

    fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.given_names.trim().is_empty() {
            fields.push("given names are required".to_string());
        }
        if self.family_name.trim().is_empty() {
            fields.push("family name is required".to_string());
        }
        if !self.email.contains('@') {
            fields.push("a valid email is required".to_string());
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            fields.push(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        validation_errors(fields)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    pub id: UserId,
    pub given_names: Option<String>,
    pub family_name: Option<String>,
    pub metadata: Option<Metadata>,
}

impl Command for UpdateUser {
    fn name(&self) -> &'static str {
        "user.update.command"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePassword {
    pub id: UserId,
    pub old_password: String,
    pub new_password: String,
}

impl Command for ChangePassword {
    fn name(&self) -> &'static str {
        "user.change-password.command"
    }

    fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.old_password.is_empty() {
            fields.push("old password is required".to_string());
        }
        if self.new_password.len() < MIN_PASSWORD_LEN {
            fields.push(format!(
                "new password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        validation_errors(fields)
    }
}

/// Reset a forgotten password with a `reset_password` purpose token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPassword {
    pub token: String,
    pub password: String,
}

impl Command for ResetPassword {
    fn name(&self) -> &'static str {
        "user.reset-password.command"
    }

    fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.token.is_empty() {
            fields.push("token is required".to_string());
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            fields.push(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        validation_errors(fields)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeUserStatus {
    pub id: UserId,
    pub state: State,
}

impl Command for ChangeUserStatus {
    fn name(&self) -> &'static str {
        "user.change-status.command"
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// User write/read façade.
///
/// Uniqueness and referential checks run here, before any persistence;
/// events publish only after the aggregate is stored.
pub struct UserApp {
    users: Arc<dyn Repository<User>>,
    roles: Arc<dyn Repository<Role>>,
    tenants: Arc<dyn Repository<Tenant>>,
    tokens: Arc<dyn TokenManager>,
    bus: Arc<dyn Bus>,
}

impl UserApp {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        roles: Arc<dyn Repository<Role>>,
        tenants: Arc<dyn Repository<Tenant>>,
        tokens: Arc<dyn TokenManager>,
        bus: Arc<dyn Bus>,
    ) -> Self {
        Self {
            users,
            roles,
            tenants,
            tokens,
            bus,
        }
    }

    /// Create a user and publish `user_created` for the onboarding saga.
    pub async fn create(&self, cmd: CreateUser) -> Result<User> {
        let command = cmd.name();
        cmd.validate()?;

        self.roles
            .read_one(&Request::one(vec![Filter::eq("id", cmd.role.to_string())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("role {}", cmd.role)))?;
        self.tenants
            .read_one(&Request::one(vec![Filter::eq(
                "id",
                cmd.tenant.to_string(),
            )]))
            .await?
            .ok_or_else(|| Error::not_found(format!("tenant {}", cmd.tenant)))?;

        let email = cmd.email.trim().to_lowercase();
        if self
            .users
            .read_one(&Request::one(vec![Filter::eq("email", email.clone())]))
            .await?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "user with email {email} already exists"
            )));
        }

        let hash = hash_password(&cmd.password)?;
        let mut user = User::new(
            cmd.given_names,
            cmd.family_name,
            email,
            hash,
            cmd.metadata,
        )?;
        self.users.create(&user).await?;

        let payload = UserCreated {
            id: user.id(),
            role: cmd.role,
            tenant: cmd.tenant,
            given_names: user.given_names().to_string(),
            family_name: user.family_name().to_string(),
            email: user.email().to_string(),
            password_hash: user.password_hash().to_string(),
            metadata: user.metadata().clone(),
            created_at: user.base().created_at(),
        };
        user.base_mut().record(DomainEvent::new(
            UserCreated::TOPIC,
            UserCreated::VERSION,
            serde_json::to_value(&payload).map_err(Error::internal)?,
        ));
        self.publish_drained(&mut user).await?;

        tracing::info!(command, user = %user.id(), "user created");
        Ok(user)
    }

    pub async fn update(&self, cmd: UpdateUser) -> Result<User> {
        let command = cmd.name();
        cmd.validate()?;
        let mut user = self.get(cmd.id).await?;
        user.update(cmd.given_names, cmd.family_name, cmd.metadata);
        self.users.update(&user).await?;
        tracing::info!(command, user = %user.id(), "user updated");
        Ok(user)
    }

    /// Rotate the password after verifying the current one.
    pub async fn change_password(&self, cmd: ChangePassword) -> Result<()> {
        let command = cmd.name();
        cmd.validate()?;
        let mut user = self.get(cmd.id).await?;
        if !verify_password(&cmd.old_password, user.password_hash())? {
            return Err(Error::unauthorized("old password does not match"));
        }
        user.set_password_hash(hash_password(&cmd.new_password)?)?;
        self.users.update(&user).await?;
        tracing::info!(command, user = %user.id(), "password changed");
        Ok(())
    }

    /// Replace a forgotten password. The bearer proves their identity with a
    /// `reset_password` purpose token instead of the old password.
    pub async fn reset_password(&self, cmd: ResetPassword) -> Result<()> {
        let command = cmd.name();
        cmd.validate()?;

        let claims = self.tokens.parse_claims(&cmd.token)?;
        if claims.kind != TokenKind::Purpose {
            return Err(Error::unauthorized("a purpose token is required"));
        }
        let (subject, purpose) = claims
            .sub
            .split_once(':')
            .ok_or_else(|| Error::unauthorized("malformed purpose token subject"))?;
        if purpose != "reset_password" {
            return Err(Error::unauthorized(format!(
                "token was issued for {purpose}, not reset_password"
            )));
        }

        let id: UserId = subject.parse()?;
        let mut user = self.get(id).await?;
        user.set_password_hash(hash_password(&cmd.password)?)?;
        self.users.update(&user).await?;
        tracing::info!(command, user = %id, "password reset");
        Ok(())
    }

    /// Move the lifecycle state machine and publish `user_change_state`.
    pub async fn change_status(&self, cmd: ChangeUserStatus) -> Result<User> {
        let command = cmd.name();
        cmd.validate()?;
        let mut user = self.get(cmd.id).await?;
        user.change_status(cmd.state)?;
        self.users.update(&user).await?;

        let payload = UserChangeState {
            id: user.id(),
            state: cmd.state,
            occurred_at: user.status().occurred_at,
        };
        user.base_mut().record(DomainEvent::new(
            UserChangeState::TOPIC,
            UserChangeState::VERSION,
            serde_json::to_value(&payload).map_err(Error::internal)?,
        ));
        self.publish_drained(&mut user).await?;

        tracing::info!(command, user = %user.id(), state = %cmd.state, "user state changed");
        Ok(user)
    }

    /// Apply a state change delivered by the bus. Does not republish, and a
    /// replayed delivery of the current state is a no-op.
    pub async fn apply_state(&self, id: UserId, state: State) -> Result<()> {
        let mut user = self.get(id).await?;
        if user.status().state == state {
            return Ok(());
        }
        user.change_status(state)?;
        self.users.update(&user).await
    }

    pub async fn read(&self, request: &Request) -> Result<ReadResult<User>> {
        self.users.read(request).await
    }

    pub async fn read_one(&self, request: &Request) -> Result<Option<User>> {
        self.users.read_one(request).await
    }

    async fn get(&self, id: UserId) -> Result<User> {
        self.users
            .read_one(&Request::one(vec![Filter::eq("id", id.to_string())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id}")))
    }

    async fn publish_drained(&self, user: &mut User) -> Result<()> {
        for event in user.drain_events() {
            let topic = event.topic.clone();
            self.bus.publish(&topic, Envelope::from(event)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use authora_core::IssueOptions;
    use authora_events::{InMemoryBus, USER_CHANGE_STATE_TOPIC, USER_CREATED_TOPIC};
    use authora_infra::{InMemoryRepository, JwtConfig, JwtManager};

    use super::*;

    struct Fixture {
        app: UserApp,
        bus: Arc<InMemoryBus>,
        manager: Arc<JwtManager>,
        role: RoleId,
        tenant: TenantId,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(InMemoryRepository::<User>::new());
        let roles = Arc::new(InMemoryRepository::<Role>::new());
        let tenants = Arc::new(InMemoryRepository::<Tenant>::new());
        let bus = Arc::new(InMemoryBus::new());
        let manager = Arc::new(JwtManager::new(JwtConfig {
            secret: "test-secret".to_string(),
            ..JwtConfig::default()
        }));

        let tenant = Tenant::new("acme", Metadata::new()).unwrap();
        tenants.create(&tenant).await.unwrap();
        let role = Role::new("member", tenant.id(), vec![]).unwrap();
        roles.create(&role).await.unwrap();

        let app = UserApp::new(users, roles, tenants, manager.clone(), bus.clone());
        Fixture {
            app,
            bus,
            manager,
            role: role.id(),
            tenant: tenant.id(),
        }
    }

    fn create_cmd(f: &Fixture, email: &str) -> CreateUser {
        CreateUser {
            given_names: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "hunter2-long".to_string(),
            role: f.role,
            tenant: f.tenant,
            metadata: Metadata::new(),
        }
    }

    async fn capture(bus: &InMemoryBus, topic: &str) -> Arc<Mutex<Vec<Envelope>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: authora_events::Handler = Arc::new(move |envelope| {
            let sink = sink.clone();
            Box::pin(async move {
                sink.lock().unwrap().push(envelope);
                Ok(())
            })
        });
        bus.subscribe(topic, "test-probe", handler).await.unwrap();
        seen
    }

    #[tokio::test]
    async fn create_publishes_user_created() {
        let f = fixture().await;
        let seen = capture(&f.bus, USER_CREATED_TOPIC).await;

        let user = f.app.create(create_cmd(&f, "Ada@Example.com")).await.unwrap();
        assert_eq!(user.email(), "ada@example.com");
        assert!(user.password_hash().starts_with("$argon2id$"));

        let envelopes = seen.lock().unwrap();
        let payload = envelopes[0].decode::<UserCreated>().unwrap();
        assert_eq!(payload.id, user.id());
        assert_eq!(payload.role, f.role);
        assert_eq!(payload.tenant, f.tenant);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let f = fixture().await;
        f.app.create(create_cmd(&f, "ada@example.com")).await.unwrap();
        let err = f
            .app
            .create(create_cmd(&f, "ADA@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn create_requires_an_existing_role_and_tenant() {
        let f = fixture().await;
        let mut cmd = create_cmd(&f, "ada@example.com");
        cmd.role = RoleId::new();
        assert!(matches!(
            f.app.create(cmd).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn short_password_fails_validation_before_any_write() {
        let f = fixture().await;
        let mut cmd = create_cmd(&f, "ada@example.com");
        cmd.password = "short".to_string();
        assert!(matches!(
            f.app.create(cmd).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn change_password_verifies_the_old_one() {
        let f = fixture().await;
        let user = f.app.create(create_cmd(&f, "ada@example.com")).await.unwrap();

        let err = f
            .app
            .change_password(ChangePassword {
                id: user.id(),
                old_password: "wrong-password".to_string(),
                new_password: "new-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));

        f.app
            .change_password(ChangePassword {
                id: user.id(),
                old_password: "hunter2-long".to_string(),
                new_password: "new-password".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reset_password_requires_a_reset_purpose_token() {
        let f = fixture().await;
        let user = f.app.create(create_cmd(&f, "ada@example.com")).await.unwrap();

        let (wrong_kind, _) = f
            .manager
            .issue_access_token(&user.id().to_string(), &BTreeMap::new(), IssueOptions::default())
            .unwrap();
        assert!(f
            .app
            .reset_password(ResetPassword {
                token: wrong_kind,
                password: "new-password".to_string(),
            })
            .await
            .is_err());

        let (token, _) = f
            .manager
            .issue_purpose_token(
                &format!("{}:reset_password", user.id()),
                &BTreeMap::new(),
                IssueOptions::default(),
            )
            .unwrap();
        f.app
            .reset_password(ResetPassword {
                token,
                password: "new-password".to_string(),
            })
            .await
            .unwrap();

        let stored = f
            .app
            .read_one(&Request::one(vec![Filter::eq("email", "ada@example.com")]))
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("new-password", stored.password_hash()).unwrap());
    }

    #[tokio::test]
    async fn change_status_publishes_and_apply_state_is_idempotent() {
        let f = fixture().await;
        let seen = capture(&f.bus, USER_CHANGE_STATE_TOPIC).await;
        let user = f.app.create(create_cmd(&f, "ada@example.com")).await.unwrap();

        f.app
            .change_status(ChangeUserStatus {
                id: user.id(),
                state: State::Active,
            })
            .await
            .unwrap();

        let payload = seen.lock().unwrap()[0].decode::<UserChangeState>().unwrap();
        assert_eq!(payload.state, State::Active);

        // Replayed delivery of the same state must not error.
        f.app.apply_state(user.id(), State::Active).await.unwrap();
    }
}
