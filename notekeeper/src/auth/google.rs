//! Google ID token verification.
//!
//! Tokens are RS256 JWTs signed with keys Google publishes as a JWKS document.
//! The key set is cached for an hour. A token naming a key the cache does not
//! know triggers at most one refetch per [`JWKS_REFRESH_COOLDOWN`], so forged
//! key ids cannot turn every request into an outbound fetch.

use super::{
    errors::{AuthError, AuthResult},
    models::FederatedIdentity,
};
use async_trait::async_trait;
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header,
    jwk::{Jwk, JwkSet},
};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Google's published signing keys
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Accepted `iss` claim values
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// How long a fetched key set is trusted
pub const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Minimum age of the cache before an unknown key id may force a refetch
pub const JWKS_REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

/// Verifies identity assertions from a third-party provider
#[async_trait]
pub trait FederatedVerifier: Send + Sync {
    /// Verify `id_token` and return the identity it asserts
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidFederatedToken` - Signature, audience, issuer or payload rejected
    /// * `AuthError::KeyFetch` - Signing keys unavailable
    async fn verify(&self, id_token: &str) -> AuthResult<FederatedIdentity>;
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Google ID tokens issued for one OAuth client
pub struct GoogleVerifier {
    client_id: String,
    jwks_url: String,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
    /// Held while fetching so concurrent misses share one request
    refresh: Mutex<()>,
}

impl GoogleVerifier {
    /// Create a verifier that accepts tokens whose audience is `client_id`
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_jwks_url(client_id, GOOGLE_JWKS_URL)
    }

    /// Create a verifier that fetches keys from a custom location
    pub fn with_jwks_url(client_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            jwks_url: jwks_url.into(),
            http: reqwest::Client::new(),
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    async fn key_for(&self, kid: &str) -> AuthResult<Jwk> {
        if let Some(found) = self.cached_key(kid).await {
            return found;
        }

        let _refresh = self.refresh.lock().await;

        // Another task may have refreshed while we waited
        if let Some(found) = self.cached_key(kid).await {
            return found;
        }

        let keys = self.fetch_keys().await?;
        let jwk = keys.find(kid).cloned();

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        jwk.ok_or_else(|| unknown_key(kid))
    }

    /// Answer from the cache, or `None` when a fetch is warranted
    async fn cached_key(&self, kid: &str) -> Option<AuthResult<Jwk>> {
        let cache = self.cache.read().await;
        let cached = cache.as_ref()?;
        let age = cached.fetched_at.elapsed();

        if age >= JWKS_CACHE_TTL {
            return None;
        }

        match cached.keys.find(kid) {
            Some(jwk) => Some(Ok(jwk.clone())),
            None if age < JWKS_REFRESH_COOLDOWN => Some(Err(unknown_key(kid))),
            None => None,
        }
    }

    async fn fetch_keys(&self) -> AuthResult<JwkSet> {
        log::debug!("Fetching signing keys from {}", self.jwks_url);

        self.http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))
    }
}

fn unknown_key(kid: &str) -> AuthError {
    AuthError::InvalidFederatedToken(format!("unknown signing key {kid}"))
}

#[async_trait]
impl FederatedVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> AuthResult<FederatedIdentity> {
        let header = decode_header(id_token)
            .map_err(|e| AuthError::InvalidFederatedToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidFederatedToken("missing key id".to_string()))?;

        let jwk = self.key_for(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| AuthError::InvalidFederatedToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let claims = decode::<GoogleClaims>(id_token, &key, &validation)
            .map_err(|e| AuthError::InvalidFederatedToken(e.to_string()))?
            .claims;

        let email = claims
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| AuthError::InvalidFederatedToken("missing email".to_string()))?;

        Ok(FederatedIdentity {
            subject: claims.sub,
            email,
            name: claims.name,
        })
    }
}
