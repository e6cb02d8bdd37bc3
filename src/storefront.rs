// Application bootstrap. Builds every collaborator once and hands them to the
// flows that need them; nothing is looked up globally.

use crate::availability::{AvailabilityClient, HttpAvailabilityClient};
use crate::config::ClientConfig;
use crate::currency::{CurrencyService, HttpRateProvider, RateProvider};
use crate::error::{ApiError, ClientError, StorefrontError};
use crate::models::{DateRange, Hotel, ReservationRecord, RoomSelection};
use crate::navigation::ReservationQuery;
use crate::orchestrator::BookingOrchestrator;
use crate::profile::{HttpProfileClient, ProfileProvider};
use crate::reservation::{HttpReservationClient, ReservationBackend, ReservationStatus};
use crate::summary::{self, ReservationSummary};
use crate::tasks::TaskRegistry;
use chrono::{Local, NaiveDate};
use std::future::Future;
use std::sync::Arc;

pub struct Storefront {
    config: ClientConfig,
    currency: Arc<CurrencyService>,
    catalog: Arc<dyn AvailabilityClient>,
    reservations: Arc<dyn ReservationBackend>,
    profiles: Arc<dyn ProfileProvider>,
    tasks: TaskRegistry,
}

impl Storefront {
    // Builds the HTTP-backed storefront. Exchange rates load in the background and
    // prices display in EUR until they land. Must be called within a tokio runtime.
    pub fn bootstrap(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = config.build_http_client()?;

        let rates = Arc::new(HttpRateProvider::new(http.clone(), config.rates_url.clone()));
        let catalog = Arc::new(HttpAvailabilityClient::new(http.clone(), &config));
        let reservations = Arc::new(HttpReservationClient::new(http.clone(), config.clone()));
        let profiles = Arc::new(HttpProfileClient::new(http, config.clone()));

        Ok(Self::with_services(config, catalog, reservations, profiles, rates))
    }

    pub fn with_services(
        config: ClientConfig,
        catalog: Arc<dyn AvailabilityClient>,
        reservations: Arc<dyn ReservationBackend>,
        profiles: Arc<dyn ProfileProvider>,
        rates: Arc<dyn RateProvider>,
    ) -> Self {
        let storefront = Self {
            config,
            currency: Arc::new(CurrencyService::new()),
            catalog,
            reservations,
            profiles,
            tasks: TaskRegistry::new(),
        };
        storefront.load_rates(rates);
        storefront
    }

    // Rates are best effort and never gate availability or booking calls
    fn load_rates(&self, rates: Arc<dyn RateProvider>) {
        let currency = Arc::clone(&self.currency);
        let preferred = self.config.default_currency.clone();
        self.tasks.spawn(async move {
            currency.initialize_with(rates.as_ref(), &preferred).await;
        });
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn currency(&self) -> &CurrencyService {
        &self.currency
    }

    pub fn in_flight_requests(&self) -> usize {
        self.tasks.in_flight()
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn parse_query(query: &str) -> ReservationQuery {
        ReservationQuery::from_query_string(query, Self::today())
    }

    async fn call<T, F>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        self.tasks.run(request).await?
    }

    pub async fn search_rooms(
        &self,
        hotel_id: u64,
        dates: DateRange,
    ) -> Result<Vec<RoomSelection>, StorefrontError> {
        let catalog = Arc::clone(&self.catalog);
        let rooms = self
            .call(async move { catalog.query_availability(hotel_id, &dates).await })
            .await?;
        Ok(rooms)
    }

    pub async fn my_reservations(&self) -> Result<Vec<ReservationRecord>, StorefrontError> {
        let reservations = Arc::clone(&self.reservations);
        let records = self
            .call(async move { reservations.my_reservations(ReservationStatus::Confirmed).await })
            .await?;
        Ok(records)
    }

    // Loads the hotel and room snapshots concurrently and opens a reservation flow
    pub async fn begin_reservation(
        &self,
        hotel_id: u64,
        query: ReservationQuery,
    ) -> Result<ReservationSession, StorefrontError> {
        let room_id = query.room_id.ok_or(StorefrontError::MissingRoomId)?;

        let catalog = Arc::clone(&self.catalog);
        let hotel_request = self.call(async move { catalog.get_hotel(hotel_id).await });
        let catalog = Arc::clone(&self.catalog);
        let room_request = self.call(async move { catalog.get_room(room_id).await });
        let (hotel, room) = futures::try_join!(hotel_request, room_request)?;

        if !room.available || !room.fits(query.guests) {
            // Not blocking: the server is the authority and will reject if needed
            tracing::warn!(
                room_id,
                available = room.available,
                max_guests = room.max_guests,
                guests = query.guests,
                "room snapshot does not look bookable"
            );
        }
        tracing::info!(hotel_id, room_id, nights = query.dates.nights(), "reservation flow started");

        let orchestrator = BookingOrchestrator::new(
            hotel_id,
            room,
            query,
            Arc::clone(&self.reservations),
            Arc::clone(&self.profiles),
        );
        Ok(ReservationSession {
            hotel,
            orchestrator: Arc::new(orchestrator),
            currency: Arc::clone(&self.currency),
        })
    }

    // Aborts outstanding storefront-level requests
    pub fn shutdown(&self) -> usize {
        let aborted = self.tasks.cancel_all();
        tracing::info!(aborted, "storefront shut down");
        aborted
    }
}

impl Drop for Storefront {
    fn drop(&mut self) {
        self.tasks.cancel_all();
    }
}

pub struct ReservationSession {
    pub hotel: Hotel,
    pub orchestrator: Arc<BookingOrchestrator>,
    currency: Arc<CurrencyService>,
}

impl ReservationSession {
    pub fn currency(&self) -> &CurrencyService {
        &self.currency
    }

    pub fn summary(&self) -> ReservationSummary {
        summary::project(
            self.orchestrator.room(),
            &self.orchestrator.dates(),
            self.orchestrator.guests(),
            &self.currency,
        )
    }

    pub fn render_summary(&self) -> String {
        self.summary().render(Some(&self.hotel))
    }
}
