//! Call reservation models
//!
//! A reservation is a scheduled call window owned by a user. Its status moves
//! through a small state machine; the expiry sweep closes out windows that
//! elapsed while still marked ongoing.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Reservation is booked but the call has not started
    #[default]
    Scheduled,
    /// A call is currently attached to the reservation
    Ongoing,
    /// The call finished (or the window elapsed)
    Completed,
    /// The reservation was called off before completion
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Scheduled => write!(f, "scheduled"),
            ReservationStatus::Ongoing => write!(f, "ongoing"),
            ReservationStatus::Completed => write!(f, "completed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl ReservationStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Some(ReservationStatus::Scheduled),
            "ongoing" => Some(ReservationStatus::Ongoing),
            "completed" => Some(ReservationStatus::Completed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if the reservation has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Completed | ReservationStatus::Cancelled
        )
    }

    /// Check whether a transition to `next` is a sanctioned edge.
    ///
    /// Same-state writes are allowed so repeated updates stay idempotent.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;

        if *self == next {
            return true;
        }

        matches!(
            (*self, next),
            (Scheduled, Ongoing) | (Scheduled, Cancelled) | (Ongoing, Completed) | (Ongoing, Cancelled)
        )
    }
}

/// Call reservation entity
///
/// Lifecycle:
/// 1. Created as `Scheduled`
/// 2. Moved to `Ongoing` when a call is attached
/// 3. Closed as `Completed` (caller-driven or by the expiry sweep) or `Cancelled`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallReservation {
    /// Unique identifier, assigned by storage at creation
    pub id: i64,

    /// Owner of the reservation
    pub username: String,

    /// Calendar date of the call window
    pub reservation_date: NaiveDate,

    /// Start of the call window
    pub start_time: NaiveTime,

    /// End of the call window; expected after `start_time` (not enforced)
    pub end_time: NaiveTime,

    /// Current lifecycle status
    pub status: ReservationStatus,

    /// Optional contact number for the call
    pub phone_number: Option<String>,

    /// External call-session identifier, set once a call is attached
    pub call_sid: Option<String>,

    /// Call duration in seconds, set on completion
    pub call_duration: Option<i32>,

    /// Creation timestamp, immutable
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl CallReservation {
    /// Check whether this reservation's window has elapsed while still ongoing.
    ///
    /// Only `Ongoing` reservations are ever overdue; the expiry sweep relies
    /// on that to stay idempotent.
    pub fn is_overdue(&self, today: NaiveDate, now: NaiveTime) -> bool {
        self.status == ReservationStatus::Ongoing
            && (self.reservation_date < today
                || (self.reservation_date == today && self.end_time < now))
    }
}

/// Fields required to create a reservation
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub username: String,
    pub reservation_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub phone_number: Option<String>,
}

/// Partial update applied to a reservation.
///
/// `None` fields are left untouched. The merge is last-write-wins at the
/// field-group level; callers needing read-modify-write safety across fields
/// must coordinate externally.
#[derive(Debug, Clone, Default)]
pub struct ReservationChanges {
    pub username: Option<String>,
    pub reservation_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: Option<ReservationStatus>,
    pub phone_number: Option<String>,
    pub call_sid: Option<String>,
    pub call_duration: Option<i32>,
}

impl ReservationChanges {
    /// Check if the update carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.reservation_date.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.status.is_none()
            && self.phone_number.is_none()
            && self.call_sid.is_none()
            && self.call_duration.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn reservation(status: ReservationStatus, date: &str, end: &str) -> CallReservation {
        let now = Utc::now();
        CallReservation {
            id: 1,
            username: "alice".to_string(),
            reservation_date: date.parse().unwrap(),
            start_time: t("09:00"),
            end_time: t(end),
            status,
            phone_number: None,
            call_sid: None,
            call_duration: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for s in [
            ReservationStatus::Scheduled,
            ReservationStatus::Ongoing,
            ReservationStatus::Completed,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(ReservationStatus::from_str(&s.to_string()), Some(s));
        }
        assert_eq!(ReservationStatus::from_str("active"), None);
        assert_eq!(
            ReservationStatus::from_str("SCHEDULED"),
            Some(ReservationStatus::Scheduled)
        );
    }

    #[test]
    fn test_default_status() {
        assert_eq!(ReservationStatus::default(), ReservationStatus::Scheduled);
    }

    #[test]
    fn test_sanctioned_transitions() {
        use ReservationStatus::*;

        assert!(Scheduled.can_transition_to(Ongoing));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Ongoing.can_transition_to(Completed));
        assert!(Ongoing.can_transition_to(Cancelled));

        assert!(!Scheduled.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Ongoing));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(!Ongoing.can_transition_to(Scheduled));

        // Same-state writes are idempotent
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ReservationStatus::Scheduled.is_terminal());
        assert!(!ReservationStatus::Ongoing.is_terminal());
        assert!(ReservationStatus::Completed.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_is_overdue() {
        let today: NaiveDate = "2025-01-10".parse().unwrap();
        let now = t("12:00");

        // Past date
        let r = reservation(ReservationStatus::Ongoing, "2025-01-09", "10:00");
        assert!(r.is_overdue(today, now));

        // Same date, window already closed
        let r = reservation(ReservationStatus::Ongoing, "2025-01-10", "11:59");
        assert!(r.is_overdue(today, now));

        // Same date, window still open
        let r = reservation(ReservationStatus::Ongoing, "2025-01-10", "12:30");
        assert!(!r.is_overdue(today, now));

        // Future date
        let r = reservation(ReservationStatus::Ongoing, "2025-01-11", "10:00");
        assert!(!r.is_overdue(today, now));

        // Not ongoing: never overdue
        let r = reservation(ReservationStatus::Scheduled, "2025-01-09", "10:00");
        assert!(!r.is_overdue(today, now));
        let r = reservation(ReservationStatus::Completed, "2025-01-09", "10:00");
        assert!(!r.is_overdue(today, now));
    }

    #[test]
    fn test_changes_is_empty() {
        assert!(ReservationChanges::default().is_empty());

        let changes = ReservationChanges {
            call_duration: Some(42),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
