//! `authora-auth`: password hashing, RBAC claims aggregation, and the
//! token service.
//!
//! Everything here works against the `authora-core` capability traits
//! (`Repository`, `TokenManager`, `Cache`); no storage or signing concretions
//! leak in.

pub mod password;
pub mod rbac;
pub mod token_service;

pub use password::{hash_password, verify_password};
pub use rbac::RbacResolver;
pub use token_service::{AuthTokens, TokenService};
