// Client configuration for the storefront backends

use crate::error::ClientError;
use reqwest::header::{AUTHORIZATION, COOKIE};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8082/api";
pub const DEFAULT_RATES_URL: &str = "https://api.frankfurter.app/latest?from=EUR";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub hotel_base_url: String,
    pub reservation_base_url: String,
    pub auth_base_url: String,
    pub rates_url: String,
    // Session token issued by the auth service, if the user is signed in
    pub session_token: Option<String>,
    // No client-side timeout unless configured
    pub request_timeout: Option<Duration>,
    pub default_currency: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hotel_base_url: DEFAULT_API_BASE.to_string(),
            reservation_base_url: DEFAULT_API_BASE.to_string(),
            auth_base_url: DEFAULT_API_BASE.to_string(),
            rates_url: DEFAULT_RATES_URL.to_string(),
            session_token: None,
            request_timeout: None,
            default_currency: "EUR".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hotel_base_url: env::var("STOREFRONT_HOTEL_URL").unwrap_or(defaults.hotel_base_url),
            reservation_base_url: env::var("STOREFRONT_RESERVATION_URL")
                .unwrap_or(defaults.reservation_base_url),
            auth_base_url: env::var("STOREFRONT_AUTH_URL").unwrap_or(defaults.auth_base_url),
            rates_url: env::var("STOREFRONT_RATES_URL").unwrap_or(defaults.rates_url),
            session_token: env::var("STOREFRONT_SESSION_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            request_timeout: env::var("STOREFRONT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            default_currency: env::var("STOREFRONT_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or(defaults.default_currency),
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        for (name, url) in [
            ("hotel_base_url", &self.hotel_base_url),
            ("reservation_base_url", &self.reservation_base_url),
            ("auth_base_url", &self.auth_base_url),
            ("rates_url", &self.rates_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ClientError::ConfigError(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }
        if self.default_currency.trim().is_empty() {
            return Err(ClientError::ConfigError(
                "default_currency must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn build_http_client(&self) -> Result<reqwest::Client, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))
    }

    // Attaches the session credentials the way the browser would: bearer header plus cookie
    pub(crate) fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_token {
            Some(token) => request
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .header(COOKIE, format!("token={}", token)),
            None => request,
        }
    }
}

// Joins a base URL and a path without doubling slashes
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
