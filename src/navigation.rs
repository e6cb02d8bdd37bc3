// URL parameters carried into the reservation flow and the route back out of it

use crate::models::DateRange;
use chrono::NaiveDate;
use reqwest::Url;
use std::fmt;

pub const PARAM_ROOM_ID: &str = "roomId";
pub const PARAM_CHECK_IN: &str = "checkInDate";
pub const PARAM_CHECK_OUT: &str = "checkOutDate";
pub const PARAM_MAX_GUESTS: &str = "maxGuests";

// Only used to borrow Url's query parsing and encoding for relative routes
const PLACEHOLDER_ORIGIN: &str = "http://storefront.local";

// Reservation entry parameters. Every field tolerates absent or malformed input:
// dates fall back to today, guests to 1, and a bad room id reads as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationQuery {
    pub room_id: Option<u64>,
    pub dates: DateRange,
    pub guests: u32,
    // Date and guest params exactly as received, replayed on cancel
    preserved: Vec<(String, String)>,
}

impl ReservationQuery {
    pub fn from_pairs<I, K, V>(pairs: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut room_id = None;
        let mut check_in = None;
        let mut check_out = None;
        let mut guests = None;
        let mut preserved = Vec::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().to_string());
            match key {
                PARAM_ROOM_ID => room_id = value.trim().parse::<u64>().ok(),
                PARAM_CHECK_IN => check_in = Some(value.clone()),
                PARAM_CHECK_OUT => check_out = Some(value.clone()),
                PARAM_MAX_GUESTS => guests = value.trim().parse::<u32>().ok().filter(|g| *g > 0),
                _ => continue,
            }
            if key != PARAM_ROOM_ID {
                preserved.retain(|(k, _): &(String, String)| k != key);
                preserved.push((key.to_string(), value));
            }
        }

        Self {
            room_id,
            dates: DateRange::from_params(check_in.as_deref(), check_out.as_deref(), today),
            guests: guests.unwrap_or(1),
            preserved,
        }
    }

    // Accepts "roomId=3&checkInDate=..." with or without the leading '?'
    pub fn from_query_string(query: &str, today: NaiveDate) -> Self {
        let query = query.trim_start_matches('?');
        match Url::parse(&format!("{}/?{}", PLACEHOLDER_ORIGIN, query)) {
            Ok(url) => Self::from_pairs(url.query_pairs(), today),
            Err(_) => Self::from_pairs(std::iter::empty::<(&str, &str)>(), today),
        }
    }

    pub fn listing_route(&self, hotel_id: u64) -> ListingRoute {
        ListingRoute {
            hotel_id,
            params: self.preserved.clone(),
        }
    }
}

// Hotel page route the flow returns to on cancel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRoute {
    pub hotel_id: u64,
    pub params: Vec<(String, String)>,
}

impl ListingRoute {
    pub fn to_path(&self) -> String {
        let path = format!("/hotel/{}", self.hotel_id);
        if self.params.is_empty() {
            return path;
        }
        match Url::parse_with_params(&format!("{}{}", PLACEHOLDER_ORIGIN, path), &self.params) {
            Ok(url) => match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            },
            Err(_) => path,
        }
    }
}

impl fmt::Display for ListingRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
