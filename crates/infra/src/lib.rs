//! `authora-infra`: in-memory collaborator implementations and the JWT
//! token manager.
//!
//! The in-memory repository and cache back the test suites and dev mode; a
//! production deployment swaps them for a document store and a shared cache
//! behind the same `authora-core` traits.

pub mod cache;
pub mod jwt;
pub mod repository;

pub use cache::InMemoryCache;
pub use jwt::{JwtConfig, JwtManager};
pub use repository::InMemoryRepository;
