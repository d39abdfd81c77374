//! `authora-app`: per-aggregate command/query façades and the event
//! consumers that stitch them together.
//!
//! Each façade validates its command, enforces uniqueness and referential
//! checks against the repositories, persists, and only then publishes.

pub mod assignment;
pub mod permission;
pub mod role;
pub mod saga;
pub mod tenant;
pub mod user;

pub use assignment::{AssignmentApp, CreateAssignment, UpdateAssignment};
pub use permission::{CreatePermission, PermissionApp, UpdatePermission};
pub use role::{CreateRole, RoleApp, UpdateRole};
pub use tenant::{CreateTenant, TenantApp, UpdateTenant};
pub use user::{
    ChangePassword, ChangeUserStatus, CreateUser, ResetPassword, UpdateUser, UserApp,
};

/// The full set of façades, bundled for consumer registration and transport
/// wiring.
pub struct Apps {
    pub users: UserApp,
    pub tenants: TenantApp,
    pub roles: RoleApp,
    pub permissions: PermissionApp,
    pub assignments: AssignmentApp,
}
