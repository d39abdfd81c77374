//! `authora-events`: domain event payloads and the bus capability.
//!
//! Events cross aggregate boundaries inside a discriminated envelope
//! (`{type, version, payload}`) that consumers validate before dispatch.

pub mod bus;
pub mod envelope;
pub mod in_memory_bus;
pub mod payload;

pub use bus::{Bus, Handler, HandlerFuture};
pub use envelope::{Envelope, EventPayload};
pub use in_memory_bus::InMemoryBus;
pub use payload::{TenantOnboard, UserChangeState, UserCreated};
pub use payload::{EVENT_STREAM, TENANT_ONBOARD_TOPIC, USER_CHANGE_STATE_TOPIC, USER_CREATED_TOPIC};
