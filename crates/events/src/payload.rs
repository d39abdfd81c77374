//! Event payloads and their stable topic names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authora_core::{RoleId, TenantId, UserId};
use authora_domain::{Metadata, State};

use crate::envelope::EventPayload;

/// Durable stream holding every authora topic.
pub const EVENT_STREAM: &str = "EVENT";

pub const USER_CREATED_TOPIC: &str = "events.authora.user_created";
pub const USER_CHANGE_STATE_TOPIC: &str = "events.authora.user_change_state";
pub const TENANT_ONBOARD_TOPIC: &str = "events.authora.tenant_onboard";

/// Published after a user is persisted; the assignment consumer turns it
/// into an onboarding assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreated {
    pub id: UserId,
    pub role: RoleId,
    pub tenant: TenantId,
    pub given_names: String,
    pub family_name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl EventPayload for UserCreated {
    const TOPIC: &'static str = USER_CREATED_TOPIC;
    const VERSION: u32 = 1;
}

/// Published after a lifecycle state change is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserChangeState {
    pub id: UserId,
    pub state: State,
    pub occurred_at: DateTime<Utc>,
}

impl EventPayload for UserChangeState {
    const TOPIC: &'static str = USER_CHANGE_STATE_TOPIC;
    const VERSION: u32 = 1;
}

/// Consumed to create a tenant (tenant onboarding flow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantOnboard {
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl EventPayload for TenantOnboard {
    const TOPIC: &'static str = TENANT_ONBOARD_TOPIC;
    const VERSION: u32 = 1;
}
