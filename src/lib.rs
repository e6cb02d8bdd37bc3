// Hotel storefront reservation library: availability lookup, currency display and
// the three-step booking flow

pub mod availability;
pub mod config;
pub mod currency;
pub mod error;
pub mod guest_form;
mod http;
pub mod models;
pub mod navigation;
pub mod orchestrator;
pub mod pricing;
pub mod profile;
pub mod reservation;
pub mod storefront;
pub mod summary;
pub mod tasks;

#[cfg(test)]
pub mod mock_server;

// Re-export key types for convenience
pub use availability::{AvailabilityClient, HttpAvailabilityClient};
pub use config::ClientConfig;
pub use currency::{CurrencyService, HttpRateProvider, RateProvider};
pub use error::{ApiError, ClientError, ConfirmError, FormError, PrefillError, StorefrontError};
pub use guest_form::{CardBrand, FormField, GuestForm};
pub use models::{
    BookingRequest, BookingResult, DateRange, Hotel, ReservationRecord, ReservationResponse,
    RoomSelection, Step, UserProfile,
};
pub use navigation::{ListingRoute, ReservationQuery};
pub use orchestrator::{BookingOrchestrator, Notice, SubmissionState};
pub use profile::{HttpProfileClient, ProfileProvider};
pub use reservation::{HttpReservationClient, ReservationBackend, ReservationStatus};
pub use storefront::{ReservationSession, Storefront};
pub use summary::ReservationSummary;
