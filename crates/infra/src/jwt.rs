//! JWT token manager (HS256).

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use authora_core::{
    Claims, Error, IssueOptions, Result, TenantGrant, TokenKind, TokenManager, TokenMeta,
};

/// Signing configuration. `Debug` leaves the secret out.
#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub purpose_ttl: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("purpose_ttl", &self.purpose_ttl)
            .finish_non_exhaustive()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "authora".to_string(),
            secret: String::new(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(30),
            purpose_ttl: Duration::minutes(15),
        }
    }
}

/// Claims in JWT wire shape (numeric iat/exp).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    kind: TokenKind,
    tenants: BTreeMap<String, TenantGrant>,
    iss: String,
    jti: String,
    iat: i64,
    exp: i64,
}

/// HS256 signer/verifier behind the `TokenManager` capability.
pub struct JwtManager {
    config: JwtConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding,
            decoding,
        }
    }

    fn issue(
        &self,
        kind: TokenKind,
        subject: &str,
        tenants: &BTreeMap<String, TenantGrant>,
        ttl: Duration,
    ) -> Result<(String, TokenMeta)> {
        let issued_at = Utc::now();
        let expires_at = issued_at + ttl;
        let jti = Uuid::now_v7().to_string();

        let claims = WireClaims {
            sub: subject.to_string(),
            kind,
            tenants: tenants.clone(),
            iss: self.config.issuer.clone(),
            jti: jti.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(Error::internal)?;

        Ok((
            token,
            TokenMeta {
                jti,
                issued_at,
                expires_at,
            },
        ))
    }

    fn ttl(&self, kind: TokenKind, opts: &IssueOptions) -> Duration {
        opts.ttl.unwrap_or(match kind {
            TokenKind::Access => self.config.access_ttl,
            TokenKind::Refresh => self.config.refresh_ttl,
            TokenKind::Purpose => self.config.purpose_ttl,
        })
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now)
}

impl TokenManager for JwtManager {
    fn issue_access_token(
        &self,
        subject: &str,
        tenants: &BTreeMap<String, TenantGrant>,
        opts: IssueOptions,
    ) -> Result<(String, TokenMeta)> {
        let ttl = self.ttl(TokenKind::Access, &opts);
        self.issue(TokenKind::Access, subject, tenants, ttl)
    }

    fn issue_refresh_token(
        &self,
        subject: &str,
        tenants: &BTreeMap<String, TenantGrant>,
        opts: IssueOptions,
    ) -> Result<(String, TokenMeta)> {
        let ttl = self.ttl(TokenKind::Refresh, &opts);
        self.issue(TokenKind::Refresh, subject, tenants, ttl)
    }

    fn issue_purpose_token(
        &self,
        subject: &str,
        tenants: &BTreeMap<String, TenantGrant>,
        opts: IssueOptions,
    ) -> Result<(String, TokenMeta)> {
        let ttl = self.ttl(TokenKind::Purpose, &opts);
        self.issue(TokenKind::Purpose, subject, tenants, ttl)
    }

    fn parse_claims(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);

        let wire = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Error::unauthorized("token has expired")
                }
                _ => Error::unauthorized(format!("invalid token: {e}")),
            })?;

        Ok(Claims {
            sub: wire.sub,
            kind: wire.kind,
            tenants: wire.tenants,
            iss: wire.iss,
            jti: wire.jti,
            issued_at: timestamp(wire.iat),
            expires_at: timestamp(wire.exp),
        })
    }
}
