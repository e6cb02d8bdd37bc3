// Booking orchestrator: drives the three-step reservation flow and owns the single
// booking submission.
//
// GuestDetails -> Payment -> Confirmation, linear. Inside Confirmation the
// submission moves Idle -> Submitting -> Confirmed | Failed, and Failed accepts
// another confirm() until a booking is Confirmed. At most one submission is in
// flight per orchestrator; separate orchestrators are not coordinated and any race
// on the same room is settled by the server as a business failure.

use crate::currency::CurrencyService;
use crate::error::{ApiError, ConfirmError, FormError, PrefillError};
use crate::guest_form::{FormField, GuestForm};
use crate::models::{BookingRequest, BookingResult, DateRange, RoomSelection, Step};
use crate::navigation::{ListingRoute, ReservationQuery};
use crate::pricing::{self, StayTotals};
use crate::profile::ProfileProvider;
use crate::reservation::{new_idempotency_key, BookingSubmission, ReservationBackend};
use crate::summary::{self, ReservationSummary};
use crate::tasks::{TaskError, TaskRegistry};
use parking_lot::Mutex;
use std::sync::Arc;

const GENERIC_BOOKING_ERROR: &str = "The reservation could not be completed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Confirmed { message: String },
    Failed { reason: String },
}

impl Default for SubmissionState {
    fn default() -> Self {
        SubmissionState::Idle
    }
}

// Transient messages for the UI; none of them block navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning {
        step: Step,
        missing: Vec<FormField>,
        message: String,
    },
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

struct FlowState {
    step: Step,
    form: GuestForm,
    submission: SubmissionState,
    notices: Vec<Notice>,
    closed: bool,
    idempotency_key: String,
}

pub struct BookingOrchestrator {
    hotel_id: u64,
    room: RoomSelection,
    query: ReservationQuery,
    backend: Arc<dyn ReservationBackend>,
    profiles: Arc<dyn ProfileProvider>,
    tasks: TaskRegistry,
    state: Mutex<FlowState>,
}

impl BookingOrchestrator {
    pub fn new(
        hotel_id: u64,
        room: RoomSelection,
        query: ReservationQuery,
        backend: Arc<dyn ReservationBackend>,
        profiles: Arc<dyn ProfileProvider>,
    ) -> Self {
        // One name slot per guest the room can hold; `guests` comes straight from the URL
        let form = GuestForm::new(query.guests.min(room.max_guests.max(1)));
        Self {
            hotel_id,
            room,
            query,
            backend,
            profiles,
            tasks: TaskRegistry::new(),
            state: Mutex::new(FlowState {
                step: Step::GuestDetails,
                form,
                submission: SubmissionState::Idle,
                notices: Vec::new(),
                closed: false,
                idempotency_key: new_idempotency_key(),
            }),
        }
    }

    pub fn hotel_id(&self) -> u64 {
        self.hotel_id
    }

    pub fn room(&self) -> &RoomSelection {
        &self.room
    }

    pub fn dates(&self) -> DateRange {
        self.query.dates
    }

    pub fn guests(&self) -> u32 {
        self.query.guests
    }

    pub fn step(&self) -> Step {
        self.state.lock().step
    }

    pub fn form(&self) -> GuestForm {
        self.state.lock().form.clone()
    }

    pub fn submission(&self) -> SubmissionState {
        self.state.lock().submission.clone()
    }

    pub fn is_reserving(&self) -> bool {
        self.state.lock().submission == SubmissionState::Submitting
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn in_flight_requests(&self) -> usize {
        self.tasks.in_flight()
    }

    pub fn totals(&self) -> StayTotals {
        pricing::stay_totals(&self.room, &self.query.dates)
    }

    pub fn summary(&self, currency: &CurrencyService) -> ReservationSummary {
        summary::project(&self.room, &self.query.dates, self.query.guests, currency)
    }

    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.lock().notices)
    }

    pub fn set_field(
        &self,
        step: Step,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let mut state = self.state.lock();
        state.form = state.form.set_field(step, field, value)?;
        Ok(())
    }

    pub fn validate_step(&self, step: Step) -> bool {
        self.state.lock().form.validate_step(step)
    }

    // Copies name, email and phone from the signed-in user. When nobody is signed in
    // the form is left untouched and `PrefillError::NotAuthenticated` tells the caller
    // to prompt for sign-in.
    pub async fn prefill_from_profile(&self) -> Result<(), PrefillError> {
        let profiles = Arc::clone(&self.profiles);
        let lookup = self
            .tasks
            .run(async move { profiles.current_profile().await })
            .await
            .map_err(|_| PrefillError::Lookup(ApiError::Cancelled))?;

        match lookup {
            Ok(Some(profile)) => {
                let mut state = self.state.lock();
                if state.closed {
                    return Err(PrefillError::Lookup(ApiError::Cancelled));
                }
                state.form = state.form.with_profile(&profile);
                tracing::info!(hotel_id = self.hotel_id, "guest details prefilled from profile");
                Ok(())
            }
            Ok(None) => Err(PrefillError::NotAuthenticated),
            Err(err) => {
                tracing::warn!(error = %err, "profile lookup failed");
                Err(PrefillError::Lookup(err))
            }
        }
    }

    // Moves forward one step if the current step validates; otherwise stays and
    // queues a warning naming the missing fields.
    pub fn advance(&self) -> Step {
        let mut state = self.state.lock();
        if state.closed {
            return state.step;
        }

        let current = state.step;
        let missing = state.form.missing_fields(current);
        if !missing.is_empty() {
            let message = match current {
                Step::GuestDetails => "Complete the guest details",
                Step::Payment => "Fill in the payment details",
                Step::Confirmation => "Review the reservation details",
            };
            tracing::warn!(step = current.number(), ?missing, "step validation failed");
            state.notices.push(Notice::Warning {
                step: current,
                missing,
                message: message.to_string(),
            });
            return current;
        }

        state.step = current.next();
        state.step
    }

    pub fn retreat(&self) -> Step {
        let mut state = self.state.lock();
        if !state.closed {
            state.step = state.step.previous();
        }
        state.step
    }

    // Leaves the flow from any step. Outstanding requests are aborted and the
    // route back to the hotel listing keeps the original date and guest params.
    pub fn cancel(&self) -> ListingRoute {
        {
            let mut state = self.state.lock();
            state.closed = true;
            if state.submission == SubmissionState::Submitting {
                state.submission = SubmissionState::Idle;
            }
        }
        let aborted = self.tasks.cancel_all();
        tracing::info!(hotel_id = self.hotel_id, aborted, "reservation flow cancelled");
        self.query.listing_route(self.hotel_id)
    }

    fn build_request(&self, form: &GuestForm) -> BookingRequest {
        BookingRequest {
            room_id: self.room.id,
            check_in_date: self.query.dates.check_in,
            check_out_date: self.query.dates.check_out,
            guests: self.query.guests,
            guest_names: form.named_guests(),
            guest_email: form.email().to_string(),
            guest_phone: form.phone_for_submission(),
            card_number: form.card_number().to_string(),
            payment_method: form.payment_method(),
        }
    }

    // Submits the booking once. Calls made while a submission is in flight, after
    // confirmation, off the last step or after cancel are no-ops reported as errors.
    pub async fn confirm(&self) -> Result<BookingResult, ConfirmError> {
        let (previous, submission, email, masked_card) = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(ConfirmError::FlowClosed);
            }
            if state.step != Step::Confirmation {
                return Err(ConfirmError::NotOnConfirmationStep(state.step));
            }
            match state.submission {
                SubmissionState::Submitting => return Err(ConfirmError::SubmissionInFlight),
                SubmissionState::Confirmed { .. } => return Err(ConfirmError::AlreadyConfirmed),
                SubmissionState::Idle | SubmissionState::Failed { .. } => {}
            }
            let missing = state.form.missing_fields(Step::Confirmation);
            if !missing.is_empty() {
                return Err(ConfirmError::Incomplete { missing });
            }

            let previous = std::mem::replace(&mut state.submission, SubmissionState::Submitting);
            let submission = BookingSubmission {
                idempotency_key: state.idempotency_key.clone(),
                request: self.build_request(&state.form),
            };
            (
                previous,
                submission,
                state.form.email().to_string(),
                state.form.masked_card_number(),
            )
        };
        let guard = SubmissionGuard {
            state: &self.state,
            previous: Some(previous),
        };

        let totals = self.totals();
        tracing::info!(
            room_id = self.room.id,
            nights = totals.nights,
            total = totals.total_price,
            card = %masked_card,
            payment_method = %submission.request.payment_method,
            "submitting reservation"
        );

        let backend = Arc::clone(&self.backend);
        let outcome = self
            .tasks
            .run(async move { backend.submit_booking(submission).await })
            .await;
        let previous = guard.disarm();

        let mut state = self.state.lock();
        if state.closed {
            return Err(ConfirmError::Cancelled);
        }

        let result = match outcome {
            Err(TaskError::Cancelled) => {
                state.submission = previous;
                return Err(ConfirmError::Cancelled);
            }
            Err(TaskError::Panicked) => {
                tracing::error!(room_id = self.room.id, "reservation task panicked");
                BookingResult::TransportFailed {
                    message: GENERIC_BOOKING_ERROR.to_string(),
                }
            }
            Ok(Ok(response)) if response.is_success() => {
                let mut message = format!(
                    "Reservation confirmed. The confirmation will be sent to {}",
                    email
                );
                if let Some(code) = response
                    .reservation
                    .as_ref()
                    .and_then(|r| r.confirmation_code.as_deref())
                {
                    message.push_str(&format!(" (confirmation code {})", code));
                }
                BookingResult::Confirmed { message }
            }
            Ok(Ok(response)) => {
                tracing::warn!(code = response.code, message = %response.message, "reservation rejected");
                BookingResult::Rejected {
                    message: non_empty_or_generic(&response.message),
                }
            }
            Ok(Err(ApiError::Rejected {
                status_code,
                code,
                message,
            })) => {
                tracing::warn!(status_code, code, %message, "reservation rejected");
                BookingResult::Rejected {
                    message: non_empty_or_generic(&message),
                }
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, room_id = self.room.id, "reservation transport failure");
                BookingResult::TransportFailed {
                    message: GENERIC_BOOKING_ERROR.to_string(),
                }
            }
        };

        match &result {
            BookingResult::Confirmed { message } => {
                tracing::info!(room_id = self.room.id, "reservation confirmed");
                state.submission = SubmissionState::Confirmed {
                    message: message.clone(),
                };
                state.notices.push(Notice::Success {
                    message: message.clone(),
                });
            }
            BookingResult::Rejected { message } => {
                // The server processed this key; a retry is a new attempt
                state.idempotency_key = new_idempotency_key();
                state.submission = SubmissionState::Failed {
                    reason: message.clone(),
                };
                state.notices.push(Notice::Error {
                    message: message.clone(),
                });
            }
            BookingResult::TransportFailed { message } => {
                state.submission = SubmissionState::Failed {
                    reason: message.clone(),
                };
                state.notices.push(Notice::Error {
                    message: message.clone(),
                });
            }
        }

        Ok(result)
    }
}

// Restores the pre-submission state when the confirm() future is dropped before
// it records an outcome. Must be disarmed before `state` is locked again.
struct SubmissionGuard<'a> {
    state: &'a Mutex<FlowState>,
    previous: Option<SubmissionState>,
}

impl SubmissionGuard<'_> {
    fn disarm(mut self) -> SubmissionState {
        self.previous.take().unwrap_or_default()
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let mut state = self.state.lock();
            if state.submission == SubmissionState::Submitting {
                tracing::debug!("confirm dropped before an outcome, submission reset");
                state.submission = previous;
            }
        }
    }
}

impl Drop for BookingOrchestrator {
    fn drop(&mut self) {
        let aborted = self.tasks.cancel_all();
        if aborted > 0 {
            tracing::debug!(aborted, "aborted requests on orchestrator teardown");
        }
    }
}

fn non_empty_or_generic(message: &str) -> String {
    if message.trim().is_empty() {
        GENERIC_BOOKING_ERROR.to_string()
    } else {
        message.to_string()
    }
}
