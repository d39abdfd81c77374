//! Token issuance, refresh, revocation, and claim checks.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Duration;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use authora_core::{
    Cache, Claims, Error, Filter, IssueOptions, Repository, Request, Result, TenantGrant,
    TokenManager, TokenRecord, UserId,
};
use authora_domain::User;

use crate::password::verify_password;
use crate::rbac::RbacResolver;

/// How long a cached access-token record lives. Revocation works by letting
/// this window lapse (or deleting the record), independent of the embedded
/// token's own expiry.
const ACCESS_RECORD_TTL_MINUTES: i64 = 15;

/// Result of a successful login.
///
/// `access_key` is the opaque cache key the client presents to refresh or
/// revoke the session; the signed tokens themselves are never used as cache
/// keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    pub access_key: String,
}

/// Login, refresh, purpose-token, and logout flows.
pub struct TokenService {
    users: Arc<dyn Repository<User>>,
    resolver: RbacResolver,
    tokens: Arc<dyn TokenManager>,
    cache: Arc<dyn Cache>,
}

impl TokenService {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        resolver: RbacResolver,
        tokens: Arc<dyn TokenManager>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            users,
            resolver,
            tokens,
            cache,
        }
    }

    /// Authenticate with email and password; on success issue an access and
    /// refresh pair and cache the access record under a fresh opaque key.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .read_one(&Request::one(vec![Filter::eq("email", email.clone())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("user with email {email}")))?;

        if !user.status().is_active() {
            return Err(Error::unauthorized(format!(
                "user is {}, login is not allowed",
                user.status().state
            )));
        }
        if !verify_password(password, user.password_hash())? {
            return Err(Error::unauthorized("password does not match"));
        }

        let subject = user.id().to_string();
        let tenants = self.resolver.resolve(user.id()).await?;
        let (access, _) =
            self.tokens
                .issue_access_token(&subject, &tenants, IssueOptions::default())?;
        let (refresh, _) =
            self.tokens
                .issue_refresh_token(&subject, &tenants, IssueOptions::default())?;

        let access_key = opaque_key("access");
        let record = TokenRecord::new(
            &access_key,
            &subject,
            tenant_scope(&tenants),
            "access",
            &access,
        );
        self.cache
            .save(&record, Duration::minutes(ACCESS_RECORD_TTL_MINUTES))
            .await?;

        tracing::info!(user = %subject, "user logged in");
        Ok(AuthTokens {
            access,
            refresh,
            access_key,
        })
    }

    /// Exchange a cached access record for a freshly minted access token.
    ///
    /// Grants are re-resolved from the store, so role and permission edits
    /// made since the last issuance land in the new token. Returns the new
    /// opaque key; an unknown or lapsed key reads as a revoked session.
    pub async fn request_access_token(&self, key: &str) -> Result<String> {
        let record = self
            .cache
            .get(key)
            .await?
            .ok_or_else(|| Error::unauthorized("access token not found or expired"))?;

        let user: UserId = record.user.parse()?;
        let tenants = self.resolver.resolve(user).await?;
        let (access, _) =
            self.tokens
                .issue_access_token(&record.user, &tenants, IssueOptions::default())?;

        let access_key = opaque_key("access");
        let next = TokenRecord::new(
            &access_key,
            &record.user,
            tenant_scope(&tenants),
            "access",
            &access,
        );
        self.cache
            .save(&next, Duration::minutes(ACCESS_RECORD_TTL_MINUTES))
            .await?;

        tracing::info!(user = %record.user, "access token refreshed");
        Ok(access_key)
    }

    /// Issue a short-lived single-purpose token with subject
    /// `"<user>:<purpose>"`. Tenant grants are resolved the same way as for
    /// access tokens.
    ///
    /// `safe` skips the active-status check, which the reset-password flow
    /// needs since the account being reset may not be active.
    pub async fn request_purpose_token(
        &self,
        user: UserId,
        purpose: &str,
        safe: bool,
    ) -> Result<String> {
        let purpose = purpose.trim();
        if purpose.is_empty() {
            return Err(Error::validation("purpose is required"));
        }

        let found = self
            .users
            .read_one(&Request::one(vec![Filter::eq("id", user.to_string())]))
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user}")))?;

        if !safe && !found.status().is_active() {
            return Err(Error::unauthorized(format!(
                "user is {}, a {purpose} token cannot be issued",
                found.status().state
            )));
        }

        let subject = format!("{user}:{purpose}");
        let tenants = self.resolver.resolve(user).await?;
        let (token, _) =
            self.tokens
                .issue_purpose_token(&subject, &tenants, IssueOptions::default())?;

        tracing::info!(user = %user, purpose, "purpose token issued");
        Ok(token)
    }

    /// Revoke the session behind an opaque key. Revoking an unknown or
    /// already-revoked key is unauthorized, not a silent success.
    pub async fn logout(&self, key: &str) -> Result<()> {
        self.cache
            .delete(key)
            .await
            .map_err(|_| Error::unauthorized("session already revoked or unknown"))?;
        tracing::info!("session revoked");
        Ok(())
    }

    /// Verify a signed token and return its decoded claims.
    pub fn parse_claims(&self, token: &str) -> Result<Claims> {
        self.tokens.parse_claims(token)
    }

    pub fn has_role(&self, token: &str, tenant: &str, role: &str) -> Result<bool> {
        Ok(self.parse_claims(token)?.has_role(tenant, role))
    }

    pub fn has_permission(
        &self,
        token: &str,
        tenant: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool> {
        Ok(self
            .parse_claims(token)?
            .has_permission(tenant, resource, action))
    }
}

/// `"<purpose>.<nonce>"` with 32 random bytes, URL-safe base64 without
/// padding. Unguessable, and the prefix makes cache keys self-describing.
fn opaque_key(purpose: &str) -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{purpose}.{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Comma-joined tenant ids the session's grants cover at issuance time.
/// Empty when the user holds no assignments.
fn tenant_scope(tenants: &BTreeMap<String, TenantGrant>) -> String {
    tenants.keys().cloned().collect::<Vec<_>>().join(",")
}
