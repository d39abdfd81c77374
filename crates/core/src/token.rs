//! Token manager capability and the cache-resident token record.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::claims::{Claims, TenantGrant};
use crate::error::Result;

/// Metadata returned alongside an issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMeta {
    pub jti: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Per-issuance options. Lifetimes default from the manager's configuration.
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    pub ttl: Option<Duration>,
}

/// Signing/verification collaborator.
///
/// The cryptographic internals are entirely behind this trait; the core only
/// ever sees signed token strings and decoded [`Claims`].
pub trait TokenManager: Send + Sync {
    fn issue_access_token(
        &self,
        subject: &str,
        tenants: &BTreeMap<String, TenantGrant>,
        opts: IssueOptions,
    ) -> Result<(String, TokenMeta)>;

    fn issue_refresh_token(
        &self,
        subject: &str,
        tenants: &BTreeMap<String, TenantGrant>,
        opts: IssueOptions,
    ) -> Result<(String, TokenMeta)>;

    fn issue_purpose_token(
        &self,
        subject: &str,
        tenants: &BTreeMap<String, TenantGrant>,
        opts: IssueOptions,
    ) -> Result<(String, TokenMeta)>;

    /// Verify signature and expiry, returning the decoded claims.
    fn parse_claims(&self, token: &str) -> Result<Claims>;
}

/// Cache-resident token record, keyed by an opaque key.
///
/// Not persisted in the primary store. The bounded cache lifetime, not the
/// embedded token's own expiry, is the revocation mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub key: String,
    pub user: String,
    /// Comma-joined tenant ids covered by the session's grants at issuance.
    /// Empty when the user holds no assignments.
    pub tenant: String,
    pub purpose: String,
    pub token: String,
}

impl TokenRecord {
    pub fn new(
        key: impl Into<String>,
        user: impl Into<String>,
        tenant: impl Into<String>,
        purpose: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            user: user.into(),
            tenant: tenant.into(),
            purpose: purpose.into(),
            token: token.into(),
        }
    }
}
