// Reservation service client: booking submission and the user's reservation list

use crate::config::{endpoint, ClientConfig};
use crate::error::ApiError;
use crate::http::decode_response;
use crate::models::{BookingRequest, ReservationRecord, ReservationResponse, ReservationsEnvelope};
use async_trait::async_trait;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Clone, PartialEq)]
pub struct BookingSubmission {
    pub idempotency_key: String,
    pub request: BookingRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }
}

pub fn new_idempotency_key() -> String {
    format!("{:032x}", rand::random::<u128>())
}

#[async_trait]
pub trait ReservationBackend: Send + Sync + 'static {
    // Returns the business envelope for any 2xx answer; callers must check `code`
    async fn submit_booking(
        &self,
        submission: BookingSubmission,
    ) -> Result<ReservationResponse, ApiError>;

    async fn my_reservations(
        &self,
        status: ReservationStatus,
    ) -> Result<Vec<ReservationRecord>, ApiError>;
}

pub struct HttpReservationClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpReservationClient {
    pub fn new(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ReservationBackend for HttpReservationClient {
    async fn submit_booking(
        &self,
        submission: BookingSubmission,
    ) -> Result<ReservationResponse, ApiError> {
        let url = endpoint(&self.config.reservation_base_url, "reservation/v1");
        tracing::debug!(%url, room_id = submission.request.room_id, "posting reservation");

        let request = self
            .client
            .post(&url)
            .header(IDEMPOTENCY_HEADER, &submission.idempotency_key)
            .json(&submission.request);
        let response = self.config.authorize(request).send().await?;
        decode_response(response).await
    }

    async fn my_reservations(
        &self,
        status: ReservationStatus,
    ) -> Result<Vec<ReservationRecord>, ApiError> {
        if self.config.session_token.is_none() {
            return Err(ApiError::Unauthenticated);
        }

        let url = endpoint(&self.config.reservation_base_url, "reservation/v1/me");
        let request = self
            .client
            .get(&url)
            .query(&[("status", status.as_str())]);
        let response = self.config.authorize(request).send().await?;
        let envelope: ReservationsEnvelope = decode_response(response).await?;
        Ok(envelope.reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_keys_are_unique_hex() {
        let a = new_idempotency_key();
        let b = new_idempotency_key();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_listing_requires_session() {
        let client = HttpReservationClient::new(reqwest::Client::new(), ClientConfig::default());
        let result = client.my_reservations(ReservationStatus::Confirmed).await;
        assert_eq!(result, Err(ApiError::Unauthenticated));
    }
}
