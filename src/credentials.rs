//! Service-account credentials and OAuth2 access tokens.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::constants::{EE_SCOPE, GOOGLE_TOKEN_URI};
use crate::models::{ServiceAccountKey, TokenResponse};

/// Tokens are refreshed this many seconds before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

impl ServiceAccountKey {
    /// Decodes a key from its environment form: base64-encoded JSON, or the
    /// JSON itself.
    pub fn decode(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let json = if raw.starts_with('{') {
            raw.as_bytes().to_vec()
        } else {
            STANDARD
                .decode(raw)
                .context("Service account key is not valid base64")?
        };

        serde_json::from_slice(&json).context("Service account key is not valid JSON")
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URI)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl<'a> AssertionClaims<'a> {
    fn new(key: &'a ServiceAccountKey, now: i64) -> Self {
        Self {
            iss: &key.client_email,
            scope: EE_SCOPE,
            aud: key.token_uri(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Exchanges signed JWT assertions for access tokens and caches the result.
pub struct TokenProvider {
    http: Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(http: Client, key: ServiceAccountKey) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("Service account private key is not a valid RSA PEM")?;

        Ok(Self {
            http,
            key,
            signing_key,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Returns a valid access token, fetching a new one if the cached token
    /// is missing or about to expire.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch_token(now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch_token(&self, now: i64) -> Result<CachedToken> {
        tracing::debug!("Requesting access token for {}", self.key.client_email);

        let claims = AssertionClaims::new(&self.key, now);
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .context("Failed to sign token assertion")?;

        let response = self
            .http
            .post(self.key.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("Token request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Token request failed with status: {} {}", status, body);
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .context("Malformed token response")?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}
