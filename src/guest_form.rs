// Guest and payment input collected across the reservation steps.
//
// The form is a value: every update returns a new record and leaves the old one
// untouched, so derived views can compare by equality. Payment capture is simulated:
// only presence is checked, never Luhn or network validity.

use crate::error::FormError;
use crate::models::{Step, UserProfile};

const MAX_CARD_DIGITS: usize = 19;
const MAX_CVV_DIGITS: usize = 4;
const MAX_EXPIRY_DIGITS: usize = 4;

// Fallback payment tag when the brand cannot be told from the number
pub const GENERIC_PAYMENT_METHOD: &str = "CARD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    // Index 0 is the primary guest
    GuestName(usize),
    Email,
    Phone,
    CardNumber,
    Expiry,
    Cvv,
    CardholderName,
}

impl FormField {
    pub fn step(self) -> Step {
        match self {
            FormField::GuestName(_) | FormField::Email | FormField::Phone => Step::GuestDetails,
            FormField::CardNumber
            | FormField::Expiry
            | FormField::Cvv
            | FormField::CardholderName => Step::Payment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBrand {
    Visa,
    Mastercard,
    AmericanExpress,
    DinersClub,
    Discover,
    Jcb,
    UnionPay,
    Maestro,
}

impl CardBrand {
    pub fn display_name(self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::AmericanExpress => "American Express",
            CardBrand::DinersClub => "Diners Club",
            CardBrand::Discover => "Discover",
            CardBrand::Jcb => "JCB",
            CardBrand::UnionPay => "UnionPay",
            CardBrand::Maestro => "Maestro",
        }
    }

    // Classifies by issuer prefix; `digits` must already be digits only
    pub fn detect(digits: &str) -> Option<CardBrand> {
        let prefix = |len: usize| -> Option<u32> {
            digits.get(..len).and_then(|p| p.parse().ok())
        };

        if let Some(p) = prefix(4) {
            match p {
                6011 => return Some(CardBrand::Discover),
                2221..=2720 => return Some(CardBrand::Mastercard),
                3528..=3589 => return Some(CardBrand::Jcb),
                6304 => return Some(CardBrand::Maestro),
                _ => {}
            }
        }
        if let Some(p) = prefix(3) {
            match p {
                300..=305 => return Some(CardBrand::DinersClub),
                644..=649 => return Some(CardBrand::Discover),
                _ => {}
            }
        }
        if let Some(p) = prefix(2) {
            match p {
                34 | 37 => return Some(CardBrand::AmericanExpress),
                36 | 38 | 39 => return Some(CardBrand::DinersClub),
                51..=55 => return Some(CardBrand::Mastercard),
                65 => return Some(CardBrand::Discover),
                62 => return Some(CardBrand::UnionPay),
                50 | 56..=58 | 67 => return Some(CardBrand::Maestro),
                _ => {}
            }
        }
        if digits.starts_with('4') {
            return Some(CardBrand::Visa);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct PaymentDetails {
    card_digits: String,
    expiry_digits: String,
    cvv: String,
    cardholder_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestForm {
    guest_names: Vec<String>,
    email: String,
    phone: String,
    payment: PaymentDetails,
}

impl GuestForm {
    // One name slot per guest, at least one
    pub fn new(guests: u32) -> Self {
        Self {
            guest_names: vec![String::new(); guests.max(1) as usize],
            email: String::new(),
            phone: String::new(),
            payment: PaymentDetails::default(),
        }
    }

    pub fn guest_slots(&self) -> usize {
        self.guest_names.len()
    }

    pub fn guest_names(&self) -> &[String] {
        &self.guest_names
    }

    pub fn primary_name(&self) -> &str {
        self.guest_names.first().map(String::as_str).unwrap_or("")
    }

    // Non-blank names in slot order, so the primary guest stays first
    pub fn named_guests(&self) -> Vec<String> {
        self.guest_names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn card_number(&self) -> &str {
        &self.payment.card_digits
    }

    // Card number grouped in fours, as the masked input renders it
    pub fn card_number_display(&self) -> String {
        self.payment
            .card_digits
            .as_bytes()
            .chunks(4)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Last four digits only; safe for logs
    pub fn masked_card_number(&self) -> String {
        let digits = &self.payment.card_digits;
        let tail = &digits[digits.len().saturating_sub(4)..];
        format!("•••• {}", tail)
    }

    pub fn expiry(&self) -> String {
        let digits = &self.payment.expiry_digits;
        if digits.len() > 2 {
            format!("{}/{}", &digits[..2], &digits[2..])
        } else {
            digits.clone()
        }
    }

    pub fn cvv(&self) -> &str {
        &self.payment.cvv
    }

    pub fn cardholder_name(&self) -> &str {
        &self.payment.cardholder_name
    }

    pub fn card_brand(&self) -> Option<CardBrand> {
        CardBrand::detect(&self.payment.card_digits)
    }

    pub fn payment_method(&self) -> String {
        self.card_brand()
            .map(|brand| brand.display_name().to_uppercase())
            .unwrap_or_else(|| GENERIC_PAYMENT_METHOD.to_string())
    }

    // Phone in E.164 form when it validates, otherwise as entered
    pub fn phone_for_submission(&self) -> String {
        normalize_phone(&self.phone).unwrap_or_else(|| self.phone.trim().to_string())
    }

    // Returns a new form with `field` replaced. The field must belong to `step`.
    pub fn set_field(
        &self,
        step: Step,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<GuestForm, FormError> {
        if field.step() != step {
            return Err(FormError::FieldNotOnStep { field, step });
        }

        let value = value.into();
        let mut next = self.clone();
        match field {
            FormField::GuestName(index) => {
                let slots = next.guest_names.len();
                let slot = next
                    .guest_names
                    .get_mut(index)
                    .ok_or(FormError::GuestSlotOutOfRange { index, slots })?;
                *slot = value;
            }
            FormField::Email => next.email = value.trim().to_string(),
            FormField::Phone => next.phone = value.trim().to_string(),
            FormField::CardNumber => next.payment.card_digits = digits_only(&value, MAX_CARD_DIGITS),
            FormField::Expiry => next.payment.expiry_digits = digits_only(&value, MAX_EXPIRY_DIGITS),
            FormField::Cvv => next.payment.cvv = digits_only(&value, MAX_CVV_DIGITS),
            FormField::CardholderName => next.payment.cardholder_name = value,
        }
        Ok(next)
    }

    // Copies identity and contact details from a signed-in profile
    pub fn with_profile(&self, profile: &UserProfile) -> GuestForm {
        let mut next = self.clone();
        if !profile.full_name.trim().is_empty() {
            next.guest_names[0] = profile.full_name.trim().to_string();
        }
        if !profile.email.trim().is_empty() {
            next.email = profile.email.trim().to_string();
        }
        if let Some(phone) = profile.phone_number.as_deref().filter(|p| !p.trim().is_empty()) {
            next.phone = phone.trim().to_string();
        }
        next
    }

    pub fn missing_fields(&self, step: Step) -> Vec<FormField> {
        let mut missing = Vec::new();
        match step {
            Step::GuestDetails => {
                if self.primary_name().trim().is_empty() {
                    missing.push(FormField::GuestName(0));
                }
                if !is_valid_email(&self.email) {
                    missing.push(FormField::Email);
                }
                if normalize_phone(&self.phone).is_none() {
                    missing.push(FormField::Phone);
                }
            }
            Step::Payment => {
                if self.payment.card_digits.is_empty() {
                    missing.push(FormField::CardNumber);
                }
                if self.payment.expiry_digits.is_empty() {
                    missing.push(FormField::Expiry);
                }
                if self.payment.cvv.is_empty() {
                    missing.push(FormField::Cvv);
                }
                if self.payment.cardholder_name.trim().is_empty() {
                    missing.push(FormField::CardholderName);
                }
            }
            Step::Confirmation => {
                missing.extend(self.missing_fields(Step::GuestDetails));
                missing.extend(self.missing_fields(Step::Payment));
            }
        }
        missing
    }

    pub fn validate_step(&self, step: Step) -> bool {
        self.missing_fields(step).is_empty()
    }
}

fn digits_only(value: &str, max: usize) -> String {
    value.chars().filter(char::is_ascii_digit).take(max).collect()
}

// Syntactic check only: one '@', non-empty local part, dotted domain, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}

// International number in E.164 form: '+', country code not starting with 0,
// 7 to 15 digits in total. Common separators are ignored.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let compact: String = phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    let digits = compact.strip_prefix('+')?;

    let valid = (7..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');
    valid.then(|| format!("+{}", digits))
}
