// Scripted collaborator doubles for unit tests

use crate::availability::AvailabilityClient;
use crate::currency::RateProvider;
use crate::error::ApiError;
use crate::models::{
    DateRange, Hotel, ReservationRecord, ReservationResponse, RoomSelection, UserProfile,
};
use crate::profile::ProfileProvider;
use crate::reservation::{BookingSubmission, ReservationBackend, ReservationStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

pub struct MockRates {
    result: Result<HashMap<String, f64>, ApiError>,
    hang: bool,
}

impl MockRates {
    pub fn ok(rates: HashMap<String, f64>) -> Self {
        Self {
            result: Ok(rates),
            hang: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ApiError::NetworkError("rates unreachable".to_string())),
            hang: false,
        }
    }

    // Never answers, like a rate API that accepts the connection and stalls
    pub fn hanging() -> Self {
        Self {
            result: Ok(HashMap::new()),
            hang: true,
        }
    }
}

#[async_trait]
impl RateProvider for MockRates {
    async fn latest_rates(&self) -> Result<HashMap<String, f64>, ApiError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.result.clone()
    }
}

// What the mock reservation server does with the next submission
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(ReservationResponse),
    Fail(ApiError),
    Hang,
}

impl Scripted {
    pub fn success() -> Self {
        Scripted::Respond(ReservationResponse {
            code: 0,
            message: "Reservation created".to_string(),
            reservation: None,
        })
    }

    pub fn business_failure(code: i32, message: &str) -> Self {
        Scripted::Respond(ReservationResponse {
            code,
            message: message.to_string(),
            reservation: None,
        })
    }
}

#[derive(Default)]
pub struct MockBackend {
    script: Mutex<VecDeque<Scripted>>,
    submissions: Mutex<Vec<BookingSubmission>>,
    reservations: Mutex<Vec<ReservationRecord>>,
    calls: AtomicUsize,
    delay_ms: AtomicU64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, step: Scripted) {
        self.script.lock().push_back(step);
    }

    pub fn set_delay(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub fn add_reservation(&self, record: ReservationRecord) {
        self.reservations.lock().push(record);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<BookingSubmission> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl ReservationBackend for MockBackend {
    async fn submit_booking(
        &self,
        submission: BookingSubmission,
    ) -> Result<ReservationResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.submissions.lock().push(submission);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let step = self.script.lock().pop_front().unwrap_or_else(Scripted::success);
        match step {
            Scripted::Respond(response) => Ok(response),
            Scripted::Fail(err) => Err(err),
            Scripted::Hang => std::future::pending().await,
        }
    }

    async fn my_reservations(
        &self,
        status: ReservationStatus,
    ) -> Result<Vec<ReservationRecord>, ApiError> {
        Ok(self
            .reservations
            .lock()
            .iter()
            .filter(|r| r.status.as_deref() == Some(status.as_str()))
            .cloned()
            .collect())
    }
}

pub struct MockProfiles {
    result: Result<Option<UserProfile>, ApiError>,
}

impl MockProfiles {
    pub fn signed_in(profile: UserProfile) -> Self {
        Self {
            result: Ok(Some(profile)),
        }
    }

    pub fn signed_out() -> Self {
        Self { result: Ok(None) }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ApiError::HttpStatus {
                status_code: 500,
                message: "Internal Server Error".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ProfileProvider for MockProfiles {
    async fn current_profile(&self) -> Result<Option<UserProfile>, ApiError> {
        self.result.clone()
    }
}

#[derive(Default)]
pub struct MockCatalog {
    hotels: Mutex<HashMap<u64, Hotel>>,
    rooms: Mutex<Vec<(u64, RoomSelection)>>,
    queries: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hotel(&self, hotel: Hotel) {
        self.hotels.lock().insert(hotel.id, hotel);
    }

    pub fn add_room(&self, hotel_id: u64, room: RoomSelection) {
        self.rooms.lock().push((hotel_id, room));
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AvailabilityClient for MockCatalog {
    async fn query_availability(
        &self,
        hotel_id: u64,
        _dates: &DateRange,
    ) -> Result<Vec<RoomSelection>, ApiError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rooms
            .lock()
            .iter()
            .filter(|(h, _)| *h == hotel_id)
            .map(|(_, room)| room.clone())
            .collect())
    }

    async fn get_room(&self, room_id: u64) -> Result<RoomSelection, ApiError> {
        self.rooms
            .lock()
            .iter()
            .find(|(_, room)| room.id == room_id)
            .map(|(_, room)| room.clone())
            .ok_or(ApiError::HttpStatus {
                status_code: 404,
                message: "Not Found".to_string(),
            })
    }

    async fn get_hotel(&self, hotel_id: u64) -> Result<Hotel, ApiError> {
        self.hotels
            .lock()
            .get(&hotel_id)
            .cloned()
            .ok_or(ApiError::HttpStatus {
                status_code: 404,
                message: "Not Found".to_string(),
            })
    }
}

pub fn sample_room() -> RoomSelection {
    RoomSelection {
        id: 12,
        room_type: "DOUBLE".to_string(),
        price_per_night: 50.0,
        max_guests: 2,
        available: true,
    }
}

pub fn sample_hotel() -> Hotel {
    Hotel {
        id: 5,
        name: "Hotel Miramar".to_string(),
        city: "Valencia".to_string(),
        country: "Spain".to_string(),
        address: Some("Paseo Maritimo 1".to_string()),
        description: None,
        stars: Some(4.0),
    }
}
