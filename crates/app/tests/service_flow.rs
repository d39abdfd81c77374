//! End-to-end flow over the in-memory collaborators: onboarding, RBAC
//! aggregation, token issuance, refresh, and revocation.

use std::sync::Arc;

use chrono::Utc;

use authora_app::{
    Apps, AssignmentApp, CreateAssignment, CreatePermission, CreateRole, CreateTenant, CreateUser,
    ChangeUserStatus, PermissionApp, RoleApp, TenantApp, UpdateRole, UserApp, saga,
};
use authora_auth::{RbacResolver, TokenService};
use authora_core::{Error, Filter, Repository, Request};
use authora_domain::{Assignment, Metadata, Permission, Role, State, Tenant, User};
use authora_events::{Bus, Envelope, EventPayload, InMemoryBus, TenantOnboard};
use authora_infra::{InMemoryCache, InMemoryRepository, JwtConfig, JwtManager};

struct Service {
    apps: Arc<Apps>,
    tokens: TokenService,
    bus: Arc<dyn Bus>,
    assignments: Arc<InMemoryRepository<Assignment>>,
}

async fn service() -> Service {
    let users = Arc::new(InMemoryRepository::<User>::new());
    let tenants = Arc::new(InMemoryRepository::<Tenant>::new());
    let roles = Arc::new(InMemoryRepository::<Role>::new());
    let permissions = Arc::new(InMemoryRepository::<Permission>::new());
    let assignments = Arc::new(InMemoryRepository::<Assignment>::new());

    let bus: Arc<dyn Bus> = Arc::new(InMemoryBus::new());
    let manager = Arc::new(JwtManager::new(JwtConfig {
        secret: "integration-secret".to_string(),
        ..JwtConfig::default()
    }));

    let apps = Arc::new(Apps {
        users: UserApp::new(
            users.clone(),
            roles.clone(),
            tenants.clone(),
            manager.clone(),
            bus.clone(),
        ),
        tenants: TenantApp::new(tenants.clone()),
        roles: RoleApp::new(roles.clone(), tenants.clone()),
        permissions: PermissionApp::new(permissions.clone()),
        assignments: AssignmentApp::new(assignments.clone(), roles.clone()),
    });
    saga::register(&bus, apps.clone()).await.unwrap();

    let resolver = RbacResolver::new(assignments.clone(), roles.clone(), permissions.clone());
    let tokens = TokenService::new(
        users,
        resolver,
        manager,
        Arc::new(InMemoryCache::new()),
    );

    Service {
        apps,
        tokens,
        bus,
        assignments,
    }
}

async fn onboard(s: &Service) -> (Tenant, Role, User) {
    let tenant = s
        .apps
        .tenants
        .create(CreateTenant {
            name: "Acme".to_string(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();

    let permission = s
        .apps
        .permissions
        .create(CreatePermission {
            resource: "billing".to_string(),
            action: "read".to_string(),
        })
        .await
        .unwrap();

    let role = s
        .apps
        .roles
        .create(CreateRole {
            name: "admin".to_string(),
            tenant: tenant.id(),
            permissions: vec![permission.id()],
        })
        .await
        .unwrap();

    let user = s
        .apps
        .users
        .create(CreateUser {
            given_names: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            email: "ada@acme.example".to_string(),
            password: "correct-horse".to_string(),
            role: role.id(),
            tenant: tenant.id(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();

    (tenant, role, user)
}

#[tokio::test]
async fn onboarding_creates_the_assignment_through_the_bus() {
    let s = service().await;
    let (tenant, role, user) = onboard(&s).await;

    let assignment = s
        .assignments
        .read_one(&Request::one(vec![Filter::eq("user", user.id().to_string())]))
        .await
        .unwrap()
        .expect("consumer created the onboarding assignment");
    assert_eq!(assignment.tenant(), tenant.id());
    assert_eq!(assignment.role(), role.id());

    // The administrative path now conflicts: one role per user per tenant.
    let err = s
        .apps
        .assignments
        .create(CreateAssignment {
            user: user.id(),
            tenant: tenant.id(),
            role: role.id(),
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn login_carries_the_aggregated_grants() {
    let s = service().await;
    let (tenant, role, user) = onboard(&s).await;

    // Not yet active: login refused with the state in the message.
    let err = s
        .tokens
        .login("ada@acme.example", "correct-horse")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("pending_verification"));

    s.apps
        .users
        .change_status(ChangeUserStatus {
            id: user.id(),
            state: State::Active,
        })
        .await
        .unwrap();

    let pair = s
        .tokens
        .login("ada@acme.example", "correct-horse")
        .await
        .unwrap();
    let claims = s.tokens.parse_claims(&pair.access).unwrap();
    assert_eq!(claims.sub, user.id().to_string());
    assert!(claims.has_role(&tenant.id().to_string(), &role.id().to_string()));
    assert!(claims.has_permission(&tenant.id().to_string(), "billing", "read"));
}

#[tokio::test]
async fn refresh_picks_up_role_edits_and_logout_revokes() {
    let s = service().await;
    let (tenant, role, user) = onboard(&s).await;
    s.apps
        .users
        .change_status(ChangeUserStatus {
            id: user.id(),
            state: State::Active,
        })
        .await
        .unwrap();
    let pair = s
        .tokens
        .login("ada@acme.example", "correct-horse")
        .await
        .unwrap();

    // Drop the role's permissions, then refresh: the new token must not
    // carry the revoked grant.
    s.apps
        .roles
        .update(UpdateRole {
            id: role.id(),
            name: None,
            permissions: Some(vec![]),
        })
        .await
        .unwrap();

    let new_key = s.tokens.request_access_token(&pair.access_key).await.unwrap();
    assert_ne!(new_key, pair.access_key);
    assert!(s
        .tokens
        .has_permission(&pair.access, &tenant.id().to_string(), "billing", "read")
        .unwrap());

    s.tokens.logout(&new_key).await.unwrap();
    assert!(matches!(
        s.tokens.request_access_token(&new_key).await.unwrap_err(),
        Error::Unauthorized(_)
    ));
}

#[tokio::test]
async fn tenant_onboard_events_are_replay_safe() {
    let s = service().await;

    let payload = TenantOnboard {
        name: "Globex".to_string(),
        metadata: Metadata::new(),
        created_at: Utc::now(),
    };
    let envelope = Envelope::of(&payload).unwrap();

    s.bus
        .publish(TenantOnboard::TOPIC, envelope.clone())
        .await
        .unwrap();
    // Redelivery: the conflict is absorbed by the consumer.
    s.bus.publish(TenantOnboard::TOPIC, envelope).await.unwrap();

    let tenant = s
        .apps
        .tenants
        .read_one(&Request::one(vec![Filter::eq("name", "Globex")]))
        .await
        .unwrap();
    assert!(tenant.is_some());
}
