// Data structures shared by the storefront clients and the booking flow

use crate::pricing;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Steps of the reservation flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    GuestDetails = 1,
    Payment = 2,
    Confirmation = 3,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    // Saturates at Confirmation
    pub fn next(self) -> Step {
        match self {
            Step::GuestDetails => Step::Payment,
            Step::Payment | Step::Confirmation => Step::Confirmation,
        }
    }

    // Saturates at GuestDetails
    pub fn previous(self) -> Step {
        match self {
            Step::GuestDetails | Step::Payment => Step::GuestDetails,
            Step::Confirmation => Step::Payment,
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::GuestDetails
    }
}

fn default_available() -> bool {
    true
}

// Snapshot of a bookable room as the backend described it at read time.
//
// The snapshot is never refreshed during a reservation flow, so it can go stale;
// the server rejects the booking if the room is no longer free.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSelection {
    pub id: u64,
    #[serde(rename = "type")]
    pub room_type: String,
    pub price_per_night: f64,
    pub max_guests: u32,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl RoomSelection {
    pub fn fits(&self, guests: u32) -> bool {
        guests <= self.max_guests
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stars: Option<f32>,
}

// Check-in/check-out pair. Ranges built from raw input are normalised by
// `from_params`; ranges built directly are floored to one night by pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl DateRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    // Parses ISO dates; if either is missing, malformed or the range is inverted,
    // both ends fall back to `today`.
    pub fn from_params(check_in: Option<&str>, check_out: Option<&str>, today: NaiveDate) -> Self {
        let parse = |raw: Option<&str>| {
            raw.map(str::trim)
                .filter(|s| !s.is_empty())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        };

        match (parse(check_in), parse(check_out)) {
            (Some(start), Some(end)) if end > start => Self::new(start, end),
            (Some(start), Some(end)) => {
                tracing::warn!(%start, %end, "check-out is not after check-in, using today");
                Self::single_day(today)
            }
            _ => Self::single_day(today),
        }
    }

    pub fn nights(&self) -> i64 {
        pricing::stay_nights(self)
    }

    pub fn is_valid(&self) -> bool {
        self.check_out > self.check_in
    }
}

// Wire payload for POST /reservation/v1
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub room_id: u64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: u32,
    pub guest_names: Vec<String>,
    pub guest_email: String,
    pub guest_phone: String,
    pub card_number: String,
    pub payment_method: String,
}

// Outcome of exactly one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingResult {
    Confirmed { message: String },
    Rejected { message: String },
    TransportFailed { message: String },
}

impl BookingResult {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, BookingResult::Confirmed { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            BookingResult::Confirmed { message }
            | BookingResult::Rejected { message }
            | BookingResult::TransportFailed { message } => message,
        }
    }
}

// Profile fields used to prefill the guest step
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

// Reservation as listed by the backend
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReservationRecord {
    pub id: u64,
    pub hotel_name: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub guests: Option<u32>,
    pub guest_names: Option<String>,
    pub total_price: Option<f64>,
    pub payment_method: Option<String>,
    pub status: Option<String>,
    pub confirmation_code: Option<String>,
}

// Business envelope returned by the reservation endpoint. `code == 0` is success,
// independent of the HTTP status.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reservation: Option<ReservationRecord>,
}

impl ReservationResponse {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

// Response envelopes of the hotel service
#[derive(Debug, Deserialize)]
pub(crate) struct HotelEnvelope {
    pub hotel: Hotel,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoomEnvelope {
    pub room: RoomSelection,
}

// The by-hotel endpoint answers either `{"room": [...]}` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RoomsEnvelope {
    Wrapped { room: Vec<RoomSelection> },
    Bare(Vec<RoomSelection>),
}

impl RoomsEnvelope {
    pub fn into_rooms(self) -> Vec<RoomSelection> {
        match self {
            RoomsEnvelope::Wrapped { room } => room,
            RoomsEnvelope::Bare(rooms) => rooms,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
    pub user: UserProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ReservationsEnvelope {
    pub reservation: Vec<ReservationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_step_transitions_saturate() {
        assert_eq!(Step::GuestDetails.previous(), Step::GuestDetails);
        assert_eq!(Step::GuestDetails.next(), Step::Payment);
        assert_eq!(Step::Payment.next(), Step::Confirmation);
        assert_eq!(Step::Confirmation.next(), Step::Confirmation);
        assert_eq!(Step::Confirmation.previous(), Step::Payment);
        assert_eq!(Step::Payment.number(), 2);
    }

    #[test_case(Some("2025-06-01"), Some("2025-06-04"), "2025-06-01", "2025-06-04"; "valid range kept")]
    #[test_case(None, None, "2025-01-10", "2025-01-10"; "missing params default to today")]
    #[test_case(Some("2025-06-01"), None, "2025-01-10", "2025-01-10"; "missing check-out")]
    #[test_case(Some("junk"), Some("2025-06-04"), "2025-01-10", "2025-01-10"; "malformed check-in")]
    #[test_case(Some("2025-06-04"), Some("2025-06-01"), "2025-01-10", "2025-01-10"; "inverted range")]
    #[test_case(Some("2025-06-04"), Some("2025-06-04"), "2025-01-10", "2025-01-10"; "empty range")]
    fn test_date_range_from_params(
        check_in: Option<&str>,
        check_out: Option<&str>,
        expected_in: &str,
        expected_out: &str,
    ) {
        let range = DateRange::from_params(check_in, check_out, date("2025-01-10"));
        assert_eq!(range.check_in, date(expected_in));
        assert_eq!(range.check_out, date(expected_out));
    }

    #[test]
    fn test_booking_request_wire_format() {
        let request = BookingRequest {
            room_id: 7,
            check_in_date: date("2025-06-01"),
            check_out_date: date("2025-06-04"),
            guests: 2,
            guest_names: vec!["Ana Lopez".to_string(), "Luis Lopez".to_string()],
            guest_email: "ana@example.com".to_string(),
            guest_phone: "+34600111222".to_string(),
            card_number: "4242424242424242".to_string(),
            payment_method: "VISA".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["roomId"], 7);
        assert_eq!(json["checkInDate"], "2025-06-01");
        assert_eq!(json["checkOutDate"], "2025-06-04");
        assert_eq!(json["guestNames"][0], "Ana Lopez");
        assert_eq!(json["paymentMethod"], "VISA");
    }

    #[test]
    fn test_rooms_envelope_accepts_both_shapes() {
        let wrapped: RoomsEnvelope = serde_json::from_str(
            r#"{"room":[{"id":1,"type":"DOUBLE","pricePerNight":80.0,"maxGuests":2}]}"#,
        )
        .unwrap();
        let bare: RoomsEnvelope = serde_json::from_str(
            r#"[{"id":2,"type":"SUITE","pricePerNight":200,"maxGuests":4,"available":false}]"#,
        )
        .unwrap();

        let wrapped = wrapped.into_rooms();
        assert_eq!(wrapped.len(), 1);
        assert!(wrapped[0].available);

        let bare = bare.into_rooms();
        assert_eq!(bare[0].room_type, "SUITE");
        assert!(!bare[0].available);
    }

    #[test]
    fn test_reservation_response_success_is_code_based() {
        let ok: ReservationResponse =
            serde_json::from_str(r#"{"code":0,"message":"created"}"#).unwrap();
        let rejected: ReservationResponse =
            serde_json::from_str(r#"{"code":409,"message":"Room not available"}"#).unwrap();

        assert!(ok.is_success());
        assert!(!rejected.is_success());
        assert_eq!(rejected.message, "Room not available");
    }
}
