// Stay pricing shared by the orchestrator and the summary projector.
// Both displays must agree, so neither computes nights or totals on its own.

use crate::models::{DateRange, RoomSelection};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StayTotals {
    pub nights: i64,
    pub total_price: f64,
}

// Whole-day difference, never below one night
pub fn stay_nights(range: &DateRange) -> i64 {
    (range.check_out - range.check_in).num_days().max(1)
}

pub fn stay_totals(room: &RoomSelection, range: &DateRange) -> StayTotals {
    let nights = stay_nights(range);
    StayTotals {
        nights,
        total_price: nights as f64 * room.price_per_night,
    }
}
