// Availability reads against the hotel service. The backend owns availability
// truth; everything returned here is a snapshot.

use crate::config::{endpoint, ClientConfig};
use crate::error::ApiError;
use crate::http::decode_response;
use crate::models::{DateRange, Hotel, HotelEnvelope, RoomEnvelope, RoomSelection, RoomsEnvelope};
use async_trait::async_trait;

#[async_trait]
pub trait AvailabilityClient: Send + Sync {
    // Rooms free for the given range. An empty list is a valid answer.
    async fn query_availability(
        &self,
        hotel_id: u64,
        dates: &DateRange,
    ) -> Result<Vec<RoomSelection>, ApiError>;

    // Single room snapshot used to seed a reservation flow
    async fn get_room(&self, room_id: u64) -> Result<RoomSelection, ApiError>;

    async fn get_hotel(&self, hotel_id: u64) -> Result<Hotel, ApiError>;
}

// Rooms from an availability answer that can take the party
pub fn bookable_for(rooms: &[RoomSelection], guests: u32) -> Vec<RoomSelection> {
    rooms
        .iter()
        .filter(|room| room.available && room.fits(guests))
        .cloned()
        .collect()
}

pub struct HttpAvailabilityClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAvailabilityClient {
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.hotel_base_url.clone(),
        }
    }
}

#[async_trait]
impl AvailabilityClient for HttpAvailabilityClient {
    async fn query_availability(
        &self,
        hotel_id: u64,
        dates: &DateRange,
    ) -> Result<Vec<RoomSelection>, ApiError> {
        let url = endpoint(&self.base_url, "room/v1/by-hotel");
        tracing::debug!(%url, hotel_id, check_in = %dates.check_in, check_out = %dates.check_out, "querying availability");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("hotelId", hotel_id.to_string()),
                ("checkIn", dates.check_in.format("%Y-%m-%d").to_string()),
                ("checkOut", dates.check_out.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        let rooms = decode_response::<RoomsEnvelope>(response)
            .await?
            .into_rooms();
        tracing::info!(hotel_id, rooms = rooms.len(), "availability received");
        Ok(rooms)
    }

    async fn get_room(&self, room_id: u64) -> Result<RoomSelection, ApiError> {
        let url = endpoint(&self.base_url, &format!("room/v1/{}", room_id));
        tracing::debug!(%url, "fetching room");
        let response = self.client.get(&url).send().await?;
        let envelope: RoomEnvelope = decode_response(response).await?;
        Ok(envelope.room)
    }

    async fn get_hotel(&self, hotel_id: u64) -> Result<Hotel, ApiError> {
        let url = endpoint(&self.base_url, &format!("hotel/v1/{}", hotel_id));
        tracing::debug!(%url, "fetching hotel");
        let response = self.client.get(&url).send().await?;
        let envelope: HotelEnvelope = decode_response(response).await?;
        Ok(envelope.hotel)
    }
}
