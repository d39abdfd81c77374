//! `authora-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives plus the narrow capability
//! traits the rest of the service consumes (repository, cache, token manager).
//! No infrastructure concerns live here.

pub mod aggregate;
pub mod cache;
pub mod claims;
pub mod command;
pub mod error;
pub mod event;
pub mod id;
pub mod query;
pub mod repository;
pub mod token;

pub use aggregate::{AggregateBase, AggregateRoot};
pub use cache::Cache;
pub use claims::{Claims, PermissionGrant, TenantGrant, TokenKind};
pub use command::{Command, validation_errors};
pub use error::{Error, Result};
pub use event::DomainEvent;
pub use id::{AssignmentId, PermissionId, RoleId, TenantId, UserId};
pub use query::{Filter, Op, Query, ReadResult, Request, Sort, SortDir};
pub use repository::Repository;
pub use token::{IssueOptions, TokenManager, TokenMeta, TokenRecord};
