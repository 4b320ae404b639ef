// Service-account OAuth2: sign a short-lived JWT with the account's RSA key
// and exchange it at the token endpoint for a bearer token. Tokens are
// cached and refreshed shortly before expiry so concurrent requests share
// one token instead of hammering the token endpoint.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::credentials::Credential;
use crate::core::provisioning::ProviderError;

/// Document editing plus file sharing. Both scopes are required because
/// creation (Docs) and permission granting (Drive) are distinct APIs.
const SCOPES: &str =
    "https://www.googleapis.com/auth/documents https://www.googleapis.com/auth/drive";

/// JWT claims for Google's OAuth2 JWT-bearer grant.
#[derive(Debug, Serialize)]
struct JwtClaims {
    /// Issuer (service account email).
    iss: String,
    /// Requested API scopes.
    scope: &'static str,
    /// Audience (token endpoint).
    aud: String,
    /// Issued at (Unix timestamp).
    iat: u64,
    /// Expiration (Unix timestamp, max 1 hour from iat).
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    expires_in: u64,
    #[allow(dead_code)]
    token_type: String,
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Authenticator holding the resolved credential and a cached access token.
pub struct ServiceAccountAuth {
    credential: Credential,
    client: Client,
    cached_token: RwLock<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(credential: Credential, client: Client) -> Self {
        Self {
            credential,
            client,
            cached_token: RwLock::new(None),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String, ProviderError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() + Duration::from_secs(60) {
                    return Ok(token.token.clone());
                }
            }
        }

        let new_token = self.fetch_new_token().await?;

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(CachedToken {
                token: new_token.clone(),
                expires_at: SystemTime::now() + Duration::from_secs(55 * 60),
            });
        }

        Ok(new_token)
    }

    async fn fetch_new_token(&self) -> Result<String, ProviderError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ProviderError::Auth(e.to_string()))?
            .as_secs();

        let claims = JwtClaims {
            iss: self.credential.key.client_email.clone(),
            scope: SCOPES,
            aud: self.credential.key.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(self.credential.key.private_key.as_bytes())
            .map_err(|e| ProviderError::Auth(format!("invalid private key: {e}")))?;
        let jwt =
            encode(&header, &claims, &key).map_err(|e| ProviderError::Auth(e.to_string()))?;

        let response = self
            .client
            .post(&self.credential.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(ProviderError::Auth(format!(
                "token exchange failed ({status}): {text}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Auth(e.to_string()))?;
        Ok(token_response.access_token)
    }
}
