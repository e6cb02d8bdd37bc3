// Command-line booking: loads the room, walks the three steps and confirms once.
//
// reserve <hotel-id> <room-id> <check-in> <check-out> <guests> <name> <email> <phone>
//         <card> <expiry> <cvv> [currency]

use std::time::Duration;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use hotel_storefront::config::ClientConfig;
use hotel_storefront::guest_form::FormField;
use hotel_storefront::models::{BookingResult, Step};
use hotel_storefront::navigation::ReservationQuery;
use hotel_storefront::orchestrator::Notice;
use hotel_storefront::storefront::Storefront;

const USAGE: &str = "usage: reserve <hotel-id> <room-id> <check-in> <check-out> <guests> \
<name> <email> <phone> <card> <expiry> <cvv> [currency]";

// How long the summary waits for exchange rates before showing EUR
const RATE_WAIT: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 11 {
        bail!(USAGE);
    }

    let hotel_id: u64 = args[0].parse().context("hotel-id must be a number")?;
    let mut config = ClientConfig::from_env();
    if let Some(currency) = args.get(11) {
        config.default_currency = currency.to_uppercase();
    }

    let storefront = Storefront::bootstrap(config)?;
    let query = ReservationQuery::from_pairs(
        [
            ("roomId", args[1].as_str()),
            ("checkInDate", args[2].as_str()),
            ("checkOutDate", args[3].as_str()),
            ("maxGuests", args[4].as_str()),
        ],
        Storefront::today(),
    );

    let session = storefront.begin_reservation(hotel_id, query).await?;
    if tokio::time::timeout(RATE_WAIT, storefront.currency().settled())
        .await
        .is_err()
    {
        tracing::warn!("exchange rates still loading, showing prices in EUR");
    }
    println!("{}\n", session.render_summary());

    let flow = &session.orchestrator;
    flow.set_field(Step::GuestDetails, FormField::GuestName(0), args[5].as_str())?;
    flow.set_field(Step::GuestDetails, FormField::Email, args[6].as_str())?;
    flow.set_field(Step::GuestDetails, FormField::Phone, args[7].as_str())?;
    flow.set_field(Step::Payment, FormField::CardholderName, args[5].as_str())?;
    flow.set_field(Step::Payment, FormField::CardNumber, args[8].as_str())?;
    flow.set_field(Step::Payment, FormField::Expiry, args[9].as_str())?;
    flow.set_field(Step::Payment, FormField::Cvv, args[10].as_str())?;

    for expected in [Step::Payment, Step::Confirmation] {
        if flow.advance() != expected {
            for notice in flow.drain_notices() {
                if let Notice::Warning { message, missing, .. } = notice {
                    eprintln!("{}: {:?}", message, missing);
                }
            }
            bail!("the reservation form is incomplete");
        }
    }

    match flow.confirm().await? {
        BookingResult::Confirmed { message } => {
            println!("{}", message);
            Ok(())
        }
        failed => {
            let back = flow.cancel();
            eprintln!("{}", failed.message());
            eprintln!("back to listing: {}", back);
            bail!("reservation failed")
        }
    }
}
