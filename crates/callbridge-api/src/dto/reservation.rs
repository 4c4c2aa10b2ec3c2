//! Reservation DTOs
//!
//! Request and response types for reservation endpoints. Required fields are
//! accepted as raw strings and validated by the lifecycle manager, so a
//! missing field surfaces as a structured `missing_field` error rather than
//! a deserialization failure.

use callbridge_core::models::CallReservation;
use callbridge_services::{CreateReservationInput, SweepOutcome, UpdateReservationInput};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Wire format for reservation dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for reservation times
const TIME_FORMAT: &str = "%H:%M";

/// Reservation creation request
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationCreateRequest {
    /// Owner of the reservation
    #[serde(default)]
    pub username: String,

    /// Calendar date, YYYY-MM-DD
    #[serde(default)]
    pub reservation_date: String,

    /// Window start, HH:MM
    #[serde(default)]
    pub start_time: String,

    /// Window end, HH:MM
    #[serde(default)]
    pub end_time: String,

    /// Optional contact number
    pub phone_number: Option<String>,
}

impl From<ReservationCreateRequest> for CreateReservationInput {
    fn from(req: ReservationCreateRequest) -> Self {
        Self {
            username: req.username,
            reservation_date: req.reservation_date,
            start_time: req.start_time,
            end_time: req.end_time,
            phone_number: req.phone_number,
        }
    }
}

/// Reservation partial-update request.
///
/// Absent fields are left untouched; the merge is last-write-wins.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReservationUpdateRequest {
    /// New owner
    pub username: Option<String>,

    /// New date, YYYY-MM-DD
    pub reservation_date: Option<String>,

    /// New window start, HH:MM
    pub start_time: Option<String>,

    /// New window end, HH:MM
    pub end_time: Option<String>,

    /// New status; must name a known state and follow a sanctioned edge
    pub status: Option<String>,

    /// New contact number
    pub phone_number: Option<String>,

    /// Call session identifier
    pub call_sid: Option<String>,

    /// Call duration in seconds
    #[validate(range(min = 0, message = "call_duration must not be negative"))]
    pub call_duration: Option<i32>,
}

impl From<ReservationUpdateRequest> for UpdateReservationInput {
    fn from(req: ReservationUpdateRequest) -> Self {
        Self {
            username: req.username,
            reservation_date: req.reservation_date,
            start_time: req.start_time,
            end_time: req.end_time,
            status: req.status,
            phone_number: req.phone_number,
            call_sid: req.call_sid,
            call_duration: req.call_duration,
        }
    }
}

/// Reservation response
#[derive(Debug, Clone, Serialize)]
pub struct ReservationResponse {
    /// Reservation ID
    pub id: i64,
    /// Owner
    pub username: String,
    /// Calendar date, YYYY-MM-DD
    pub reservation_date: String,
    /// Window start, HH:MM
    pub start_time: String,
    /// Window end, HH:MM
    pub end_time: String,
    /// Lifecycle status
    pub status: String,
    /// Contact number
    pub phone_number: Option<String>,
    /// Call session identifier
    pub call_sid: Option<String>,
    /// Call duration in seconds
    pub call_duration: Option<i32>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<CallReservation> for ReservationResponse {
    fn from(reservation: CallReservation) -> Self {
        Self {
            id: reservation.id,
            username: reservation.username,
            reservation_date: reservation.reservation_date.format(DATE_FORMAT).to_string(),
            start_time: reservation.start_time.format(TIME_FORMAT).to_string(),
            end_time: reservation.end_time.format(TIME_FORMAT).to_string(),
            status: reservation.status.to_string(),
            phone_number: reservation.phone_number,
            call_sid: reservation.call_sid,
            call_duration: reservation.call_duration,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}

/// Expiry sweep response
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    /// Number of reservations completed by this sweep
    pub count: usize,
    /// The completed records
    pub records: Vec<ReservationResponse>,
}

impl From<SweepOutcome> for SweepResponse {
    fn from(outcome: SweepOutcome) -> Self {
        Self {
            count: outcome.count,
            records: outcome.records.into_iter().map(Into::into).collect(),
        }
    }
}
