// Currency conversion for price display. Prices are stored in EUR and converted
// with the latest EUR-based rate table at render time.

use crate::error::ApiError;
use crate::http::decode_response;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::watch;

pub const BASE_CURRENCY: &str = "EUR";

pub const SUPPORTED_CURRENCIES: [&str; 9] = [
    "EUR", "USD", "GBP", "JPY", "AUD", "CAD", "CHF", "BRL", "MXN",
];

pub fn currency_symbol(code: &str) -> &'static str {
    match code {
        "EUR" => "€",
        "USD" => "$",
        "GBP" => "£",
        "JPY" => "¥",
        "AUD" => "A$",
        "CAD" => "C$",
        "CHF" => "CHF",
        "BRL" => "R$",
        "MXN" => "MX$",
        _ => "",
    }
}

// Source of EUR-based exchange rates
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn latest_rates(&self) -> Result<HashMap<String, f64>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct RatesPayload {
    rates: HashMap<String, f64>,
}

pub struct HttpRateProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpRateProvider {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn latest_rates(&self) -> Result<HashMap<String, f64>, ApiError> {
        tracing::debug!(url = %self.url, "fetching exchange rates");
        let response = self.client.get(&self.url).send().await?;
        let payload: RatesPayload = decode_response(response).await?;
        Ok(payload.rates)
    }
}

#[derive(Debug, Clone)]
struct Selection {
    code: String,
    rate: f64,
}

// Application-wide currency state. Constructed once at bootstrap and shared by reference.
#[derive(Debug)]
pub struct CurrencyService {
    rates: RwLock<HashMap<String, f64>>,
    selection: RwLock<Selection>,
    // Flips to true once a rate load has finished, successfully or not
    settled: watch::Sender<bool>,
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrencyService {
    pub fn new() -> Self {
        Self {
            rates: RwLock::new(HashMap::new()),
            selection: RwLock::new(Selection {
                code: BASE_CURRENCY.to_string(),
                rate: 1.0,
            }),
            settled: watch::channel(false).0,
        }
    }

    pub fn with_rates(rates: HashMap<String, f64>) -> Self {
        let service = Self::new();
        *service.rates.write() = rates;
        service.settled.send_replace(true);
        service
    }

    // Loads the rate table once. A failed fetch leaves the table empty so every
    // conversion degrades to EUR passthrough; the error is logged, never returned.
    pub async fn initialize(&self, provider: &dyn RateProvider) -> usize {
        let loaded = self.fetch_rates(provider).await;
        self.settled.send_replace(true);
        loaded
    }

    // Like `initialize`, then switches to `preferred` if any rates arrived. The
    // switch happens before `settled()` resolves.
    pub async fn initialize_with(&self, provider: &dyn RateProvider, preferred: &str) -> usize {
        let loaded = self.fetch_rates(provider).await;
        if loaded > 0 {
            self.select(preferred);
        }
        self.settled.send_replace(true);
        loaded
    }

    async fn fetch_rates(&self, provider: &dyn RateProvider) -> usize {
        match provider.latest_rates().await {
            Ok(rates) => {
                let count = rates.len();
                *self.rates.write() = rates;
                tracing::info!(count, "exchange rates loaded");
                count
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not load exchange rates, prices stay in EUR");
                0
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        *self.settled.borrow()
    }

    // Resolves once a rate load has finished; until then prices display in EUR
    pub async fn settled(&self) {
        let mut settled = self.settled.subscribe();
        let _ = settled.wait_for(|done| *done).await;
    }

    // Switches the display currency. A code missing from the table keeps the
    // previous rate rather than resetting it.
    pub fn select(&self, currency_code: &str) {
        let code = currency_code.trim().to_uppercase();
        let known_rate = if code == BASE_CURRENCY {
            Some(1.0)
        } else {
            self.rates.read().get(&code).copied()
        };

        let mut selection = self.selection.write();
        if known_rate.is_none() {
            tracing::debug!(currency = %code, "no rate for currency, keeping previous rate");
        }
        selection.code = code;
        if let Some(rate) = known_rate {
            selection.rate = rate;
        }
    }

    pub fn currency(&self) -> String {
        self.selection.read().code.clone()
    }

    pub fn rate(&self) -> f64 {
        self.selection.read().rate
    }

    pub fn supported_currencies(&self) -> &'static [&'static str] {
        &SUPPORTED_CURRENCIES
    }

    pub fn convert(&self, amount_eur: f64) -> f64 {
        amount_eur * self.rate()
    }

    pub fn format(&self, amount_eur: f64) -> String {
        let selection = self.selection.read().clone();
        format!(
            "{:.2} {}",
            round_cents(amount_eur * selection.rate),
            currency_symbol(&selection.code)
        )
    }
}

// Ties go away from zero (0.125 -> 0.13); `{:.2}` alone would round them to even
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
