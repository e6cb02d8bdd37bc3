// Signed-in user lookup used to prefill the guest step

use crate::config::{endpoint, ClientConfig};
use crate::error::ApiError;
use crate::http::decode_response;
use crate::models::{ProfileEnvelope, UserProfile};
use async_trait::async_trait;
use reqwest::StatusCode;

#[async_trait]
pub trait ProfileProvider: Send + Sync {
    // `Ok(None)` means nobody is signed in; that is not an error
    async fn current_profile(&self) -> Result<Option<UserProfile>, ApiError>;
}

pub struct HttpProfileClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpProfileClient {
    pub fn new(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ProfileProvider for HttpProfileClient {
    async fn current_profile(&self) -> Result<Option<UserProfile>, ApiError> {
        if self.config.session_token.is_none() {
            return Ok(None);
        }

        let url = endpoint(&self.config.auth_base_url, "auth/me");
        tracing::debug!(%url, "fetching current user");
        let response = self
            .config
            .authorize(self.client.get(&url))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::info!("session token rejected, profile prefill unavailable");
            return Ok(None);
        }

        let envelope: ProfileEnvelope = decode_response(response).await?;
        Ok(Some(envelope.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_session_token_means_signed_out() {
        let client = HttpProfileClient::new(reqwest::Client::new(), ClientConfig::default());
        assert_eq!(client.current_profile().await, Ok(None));
    }
}
