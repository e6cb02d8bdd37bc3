// Error types shared across the storefront clients and the booking flow

use crate::guest_form::FormField;
use crate::models::Step;
use thiserror::Error;

// Failures talking to one of the backend collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP error: {status_code} - {message}")]
    HttpStatus { status_code: u16, message: String },

    #[error("Rejected by server (code {code}): {message}")]
    Rejected {
        status_code: u16,
        code: i32,
        message: String,
    },

    #[error("Response decode error: {0}")]
    DecodeError(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    // Business failures carry a server message that can be shown to the user as-is
    pub fn is_business_failure(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::DecodeError(err.to_string())
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::DecodeError(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

// Rejections from the guest/payment form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Field {field:?} does not belong to step {step:?}")]
    FieldNotOnStep { field: FormField, step: Step },

    #[error("Guest slot {index} out of range ({slots} slots)")]
    GuestSlotOutOfRange { index: usize, slots: usize },
}

// Reasons a confirm() call did nothing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmError {
    #[error("Confirmation is only possible on the last step (current: {0:?})")]
    NotOnConfirmationStep(Step),

    #[error("A booking submission is already in flight")]
    SubmissionInFlight,

    #[error("Reservation already confirmed")]
    AlreadyConfirmed,

    #[error("Reservation details are incomplete: {missing:?}")]
    Incomplete { missing: Vec<FormField> },

    #[error("Reservation flow was closed")]
    FlowClosed,

    #[error("Submission was cancelled before it completed")]
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrefillError {
    #[error("Sign in to use your profile details")]
    NotAuthenticated,

    #[error("Could not load the user profile: {0}")]
    Lookup(ApiError),
}

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Missing roomId parameter")]
    MissingRoomId,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
