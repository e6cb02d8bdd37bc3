// Read-only reservation summary shown next to the booking form

use crate::currency::CurrencyService;
use crate::models::{DateRange, Hotel, RoomSelection};
use crate::pricing;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationSummary {
    pub room_id: u64,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub nights: i64,
    pub price_per_night: f64,
    pub total_price_eur: f64,
    pub formatted_total: String,
    pub currency: String,
}

// Projects the summary from the flow inputs. Recomputed on every call, and
// uses the same pricing as the orchestrator so both always agree.
pub fn project(
    room: &RoomSelection,
    dates: &DateRange,
    guests: u32,
    currency: &CurrencyService,
) -> ReservationSummary {
    let totals = pricing::stay_totals(room, dates);
    ReservationSummary {
        room_id: room.id,
        room_type: room.room_type.clone(),
        check_in: dates.check_in,
        check_out: dates.check_out,
        guests,
        nights: totals.nights,
        price_per_night: room.price_per_night,
        total_price_eur: totals.total_price,
        formatted_total: currency.format(totals.total_price),
        currency: currency.currency(),
    }
}

impl ReservationSummary {
    // Plain-text rendering for terminals and logs
    pub fn render(&self, hotel: Option<&Hotel>) -> String {
        let mut lines = Vec::new();
        if let Some(hotel) = hotel {
            if hotel.city.is_empty() {
                lines.push(hotel.name.clone());
            } else {
                lines.push(format!("{} ({}, {})", hotel.name, hotel.city, hotel.country));
            }
        }
        lines.push(format!("Room: {} (No. {})", self.room_type, self.room_id));
        lines.push(format!(
            "Dates: {} - {} ({} {})",
            self.check_in,
            self.check_out,
            self.nights,
            if self.nights == 1 { "night" } else { "nights" }
        ));
        lines.push(format!("Guests: {}", self.guests));
        lines.push(format!("Price per night: {:.2}", self.price_per_night));
        lines.push(format!("Total: {}", self.formatted_total));
        lines.join("\n")
    }
}
