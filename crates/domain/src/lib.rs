//! `authora-domain`: the five aggregates of the identity service.
//!
//! User (with its lifecycle state machine), Tenant, Role, Permission, and
//! Assignment. Pure domain state and invariants; persistence and event
//! publication are orchestrated by the application layer.

pub mod assignment;
pub mod permission;
pub mod role;
pub mod status;
pub mod tenant;
pub mod user;

pub use assignment::Assignment;
pub use permission::Permission;
pub use role::Role;
pub use status::{State, Status, StatusError};
pub use tenant::Tenant;
pub use user::User;

/// Free-form metadata attached to aggregates.
pub type Metadata = serde_json::Map<String, serde_json::Value>;
