use super::{Clock, ServiceAccountCredential, sign};
use crate::error::AuthError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion.
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[async_trait]
pub trait MintToken: Send + Sync {
    /// Obtain a fresh bearer access token for `credential`.
    async fn mint(&self, credential: &ServiceAccountCredential) -> Result<String, AuthError>;
}

#[derive(Debug, Serialize)]
struct AssertionHeader {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges signed JWT-bearer assertions for access tokens at an OAuth2 token endpoint.
#[derive(Debug, Clone)]
pub struct ServiceAccountMinter {
    http_client: reqwest::Client,
    token_url: String,
    clock: Arc<dyn Clock>,
}

impl ServiceAccountMinter {
    pub fn new(http_client: reqwest::Client, token_url: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            http_client,
            token_url: token_url.into(),
            clock,
        }
    }

    /// Build `base64url(header).base64url(claims).base64url(signature)`.
    pub fn build_assertion(&self, credential: &ServiceAccountCredential) -> Result<String, AuthError> {
        let issued_at = self.clock.now().timestamp();

        let header = AssertionHeader {
            alg: "RS256",
            typ: "JWT",
        };
        let claims = Claims {
            iss: &credential.email,
            scope: credential.scope_claim(),
            aud: &self.token_url,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
        let signature = sign(signing_input.as_bytes(), &credential.private_key)?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value).map_err(|e| {
        AuthError::TokenExchangeFailed(format!("failed to encode assertion: {}", e))
    })?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

#[async_trait]
impl MintToken for ServiceAccountMinter {
    #[instrument(name = "Exchanging assertion for access token", skip_all, fields(iss = %credential.email))]
    async fn mint(&self, credential: &ServiceAccountCredential) -> Result<String, AuthError> {
        let assertion = self.build_assertion(credential)?;

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "Token endpoint rejected assertion");
            return Err(AuthError::TokenExchangeFailed(body));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AuthError::TokenExchangeFailed(format!("invalid token response: {}", e))
        })?;

        debug!("Access token minted");

        Ok(token.access_token)
    }
}
