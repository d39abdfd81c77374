//! Event consumers wiring the cross-aggregate flows.
//!
//! Delivery is at-least-once, so every handler must tolerate replay. The
//! write paths already enforce uniqueness; a conflict on a redelivered event
//! therefore means the work is done, and the handler acknowledges it.

use std::sync::Arc;

use authora_core::Result;
use authora_events::{
    Bus, Envelope, EVENT_STREAM, Handler, TENANT_ONBOARD_TOPIC, TenantOnboard,
    USER_CHANGE_STATE_TOPIC, USER_CREATED_TOPIC, UserChangeState, UserCreated,
};

use crate::assignment::CreateAssignment;
use crate::tenant::CreateTenant;
use crate::Apps;

const ASSIGNMENT_GROUP: &str = "authora.assignments";
const TENANT_GROUP: &str = "authora.tenants";
const USER_GROUP: &str = "authora.users";

/// Ensure the stream and register every consumer.
pub async fn register(bus: &Arc<dyn Bus>, apps: Arc<Apps>) -> Result<()> {
    bus.ensure_stream(
        EVENT_STREAM,
        &[
            USER_CREATED_TOPIC,
            USER_CHANGE_STATE_TOPIC,
            TENANT_ONBOARD_TOPIC,
        ],
    )
    .await?;

    bus.subscribe(USER_CREATED_TOPIC, ASSIGNMENT_GROUP, on_user_created(apps.clone()))
        .await?;
    bus.subscribe(TENANT_ONBOARD_TOPIC, TENANT_GROUP, on_tenant_onboard(apps.clone()))
        .await?;
    bus.subscribe(USER_CHANGE_STATE_TOPIC, USER_GROUP, on_user_change_state(apps))
        .await?;

    Ok(())
}

/// `user_created` → onboarding assignment in the user's initial tenant.
fn on_user_created(apps: Arc<Apps>) -> Handler {
    Arc::new(move |envelope: Envelope| {
        let apps = apps.clone();
        Box::pin(async move {
            let payload: UserCreated = envelope.decode()?;
            let result = apps
                .assignments
                .create(CreateAssignment {
                    user: payload.id,
                    tenant: payload.tenant,
                    role: payload.role,
                })
                .await;
            match result {
                Ok(_) => Ok(()),
                Err(err) if err.is_conflict() => {
                    tracing::warn!(user = %payload.id, "assignment already exists, event replayed");
                    Ok(())
                }
                Err(err) => Err(err),
            }
        })
    })
}

/// `tenant_onboard` → tenant record.
fn on_tenant_onboard(apps: Arc<Apps>) -> Handler {
    Arc::new(move |envelope: Envelope| {
        let apps = apps.clone();
        Box::pin(async move {
            let payload: TenantOnboard = envelope.decode()?;
            let result = apps
                .tenants
                .create(CreateTenant {
                    name: payload.name.clone(),
                    metadata: payload.metadata,
                })
                .await;
            match result {
                Ok(_) => Ok(()),
                Err(err) if err.is_conflict() => {
                    tracing::warn!(name = %payload.name, "tenant already exists, event replayed");
                    Ok(())
                }
                Err(err) => Err(err),
            }
        })
    })
}

/// `user_change_state` → apply the state to the local user record.
fn on_user_change_state(apps: Arc<Apps>) -> Handler {
    Arc::new(move |envelope: Envelope| {
        let apps = apps.clone();
        Box::pin(async move {
            let payload: UserChangeState = envelope.decode()?;
            apps.users.apply_state(payload.id, payload.state).await
        })
    })
}
