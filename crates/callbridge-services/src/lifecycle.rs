//! Reservation lifecycle manager
//!
//! Owns the reservation state machine: creation, validated status
//! transitions, and the expiry sweep that closes out ongoing reservations
//! whose window has elapsed.
//!
//! The manager is the only component permitted to mutate reservation records;
//! it works exclusively through the `ReservationRepository` trait.

use callbridge_core::{
    models::{CallReservation, NewReservation, ReservationChanges, ReservationStatus},
    traits::ReservationRepository,
    AppError, AppResult,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::constants::{DATE_FORMAT, TIME_FORMATS};

/// Raw input for reservation creation.
///
/// Fields arrive as strings from the transport layer; validation and parsing
/// are part of this manager's contract.
#[derive(Debug, Clone)]
pub struct CreateReservationInput {
    pub username: String,
    pub reservation_date: String,
    pub start_time: String,
    pub end_time: String,
    pub phone_number: Option<String>,
}

/// Raw partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateReservationInput {
    pub username: Option<String>,
    pub reservation_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
    pub phone_number: Option<String>,
    pub call_sid: Option<String>,
    pub call_duration: Option<i32>,
}

/// Result of an expiry sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub count: usize,
    pub records: Vec<CallReservation>,
}

/// Reservation lifecycle manager
pub struct ReservationLifecycle<R: ReservationRepository> {
    repo: Arc<R>,
}

impl<R: ReservationRepository> ReservationLifecycle<R> {
    /// Create a new lifecycle manager
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Create a reservation in `scheduled` state.
    ///
    /// All four required fields must be present and well-formed; nothing is
    /// persisted otherwise.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateReservationInput) -> AppResult<CallReservation> {
        let username = required_field(&input.username, "username")?.to_string();
        let reservation_date = parse_date(&input.reservation_date, "reservation_date")?;
        let start_time = parse_time(&input.start_time, "start_time")?;
        let end_time = parse_time(&input.end_time, "end_time")?;

        if end_time <= start_time {
            warn!(
                %start_time, %end_time,
                "Reservation window ends at or before it starts"
            );
        }

        let created = self
            .repo
            .create(&NewReservation {
                username,
                reservation_date,
                start_time,
                end_time,
                phone_number: input.phone_number.filter(|p| !p.trim().is_empty()),
            })
            .await?;

        info!(id = created.id, username = %created.username, "Reservation created");
        Ok(created)
    }

    /// All reservations for a user, ordered by reservation date ascending
    #[instrument(skip(self))]
    pub async fn list_by_user(&self, username: &str) -> AppResult<Vec<CallReservation>> {
        self.repo.list_by_user(username).await
    }

    /// Fetch a single reservation by its raw (string) identifier
    #[instrument(skip(self))]
    pub async fn get(&self, raw_id: &str) -> AppResult<CallReservation> {
        let id = parse_id(raw_id)?;

        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))
    }

    /// Merge a partial update into a reservation.
    ///
    /// Status values must name a known state and the change must follow a
    /// sanctioned edge of the state machine; anything else is rejected before
    /// touching storage. The field merge itself is last-write-wins.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        raw_id: &str,
        input: UpdateReservationInput,
    ) -> AppResult<CallReservation> {
        let id = parse_id(raw_id)?;

        let status = input
            .status
            .as_deref()
            .map(|s| {
                ReservationStatus::from_str(s)
                    .ok_or_else(|| AppError::Validation(format!("Unknown status: {}", s)))
            })
            .transpose()?;

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))?;

        if let Some(next) = status {
            if !current.status.can_transition_to(next) {
                warn!(id, from = %current.status, to = %next, "Rejected status transition");
                return Err(AppError::InvalidTransition(format!(
                    "{} -> {}",
                    current.status, next
                )));
            }
        }

        let changes = ReservationChanges {
            username: input.username,
            reservation_date: input
                .reservation_date
                .as_deref()
                .map(|d| parse_date(d, "reservation_date"))
                .transpose()?,
            start_time: input
                .start_time
                .as_deref()
                .map(|t| parse_time(t, "start_time"))
                .transpose()?,
            end_time: input
                .end_time
                .as_deref()
                .map(|t| parse_time(t, "end_time"))
                .transpose()?,
            status,
            phone_number: input.phone_number,
            call_sid: input.call_sid,
            call_duration: input.call_duration,
        };

        let updated = self
            .repo
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))?;

        info!(id, status = %updated.status, "Reservation updated");
        Ok(updated)
    }

    /// Run the expiry sweep against the current clock
    pub async fn sweep_expired(&self) -> AppResult<SweepOutcome> {
        let now = Utc::now();
        self.sweep_expired_at(now.date_naive(), now.time()).await
    }

    /// Run the expiry sweep against an explicit clock.
    ///
    /// Selects every ongoing reservation whose window closed before the given
    /// date/time and completes each one independently; records that moved on
    /// between the read and the write are skipped, not errors. Safe to invoke
    /// repeatedly; an empty result is success.
    #[instrument(skip(self))]
    pub async fn sweep_expired_at(
        &self,
        today: NaiveDate,
        now: NaiveTime,
    ) -> AppResult<SweepOutcome> {
        let overdue = self.repo.find_overdue_ongoing(today, now).await?;
        debug!(candidates = overdue.len(), "Expiry sweep selected candidates");

        let mut records = Vec::with_capacity(overdue.len());
        for reservation in overdue {
            match self.repo.complete_expired(reservation.id).await? {
                Some(completed) => records.push(completed),
                None => {
                    // Already moved past ongoing by a concurrent writer
                    debug!(id = reservation.id, "Skipping already-settled reservation");
                }
            }
        }

        if !records.is_empty() {
            info!(count = records.len(), "Expiry sweep completed reservations");
        }

        Ok(SweepOutcome {
            count: records.len(),
            records,
        })
    }
}

fn required_field<'a>(value: &'a str, field: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingField(field.to_string()));
    }
    Ok(trimmed)
}

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid reservation id: {}", raw)))
}

fn parse_date(raw: &str, field: &str) -> AppResult<NaiveDate> {
    let raw = required_field(raw, field)?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("{} must be a YYYY-MM-DD date: {}", field, raw)))
}

fn parse_time(raw: &str, field: &str) -> AppResult<NaiveTime> {
    let raw = required_field(raw, field)?;
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| AppError::Validation(format!("{} must be an HH:MM time: {}", field, raw)))
}
