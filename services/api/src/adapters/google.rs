//! services/api/src/adapters/google.rs
//!
//! Verifies Google ID tokens against the public tokeninfo endpoint and
//! implements the `ExternalIdentityProvider` port.

use async_trait::async_trait;
use medilog_core::domain::ExternalIdentity;
use medilog_core::ports::{ExternalIdentityProvider, PortError, PortResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, warn};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Deserialize)]
struct TokenInfo {
    aud: String,
    iss: String,
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Clone)]
pub struct GoogleIdentityAdapter {
    client: reqwest::Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleIdentityAdapter {
    pub fn new(client_id: String) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            client,
            client_id,
            tokeninfo_url: TOKENINFO_URL.to_string(),
        })
    }

    fn check(&self, info: TokenInfo) -> PortResult<ExternalIdentity> {
        if info.aud != self.client_id {
            warn!("Google token issued for another audience");
            return Err(PortError::Unauthorized);
        }
        if !ISSUERS.contains(&info.iss.as_str()) {
            warn!("Google token from unexpected issuer {}", info.iss);
            return Err(PortError::Unauthorized);
        }
        Ok(ExternalIdentity {
            subject: info.sub,
            email: info.email,
            display_name: info.name,
        })
    }
}

#[async_trait]
impl ExternalIdentityProvider for GoogleIdentityAdapter {
    async fn verify(&self, token: &str) -> PortResult<ExternalIdentity> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| {
                error!("Google tokeninfo request failed: {}", e);
                PortError::Unexpected(e.to_string())
            })?;

        if response.status().is_client_error() {
            return Err(PortError::Unauthorized);
        }
        let info = response
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json::<TokenInfo>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.check(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, iss: &str) -> TokenInfo {
        TokenInfo {
            aud: aud.to_string(),
            iss: iss.to_string(),
            sub: "1234".to_string(),
            email: Some("g@example.com".to_string()),
            name: None,
        }
    }

    #[test]
    fn accepts_tokens_for_this_client() {
        let adapter = GoogleIdentityAdapter::new("client-1".to_string()).unwrap();
        let identity = adapter.check(info("client-1", "accounts.google.com")).unwrap();
        assert_eq!(identity.subject, "1234");
        assert_eq!(identity.email.as_deref(), Some("g@example.com"));
    }

    #[test]
    fn rejects_other_audiences_and_issuers() {
        let adapter = GoogleIdentityAdapter::new("client-1".to_string()).unwrap();
        assert!(matches!(
            adapter.check(info("client-2", "accounts.google.com")),
            Err(PortError::Unauthorized)
        ));
        assert!(matches!(
            adapter.check(info("client-1", "evil.example.com")),
            Err(PortError::Unauthorized)
        ));
    }
}
