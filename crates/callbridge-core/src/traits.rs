//! Common traits for repositories
//!
//! Defines the storage abstraction the lifecycle manager works against, so
//! business logic can be exercised without a live database.

use crate::error::AppError;
use crate::models::{CallReservation, NewReservation, ReservationChanges};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

/// Reservation storage
///
/// The lifecycle manager is the only caller permitted to mutate reservation
/// records; everything goes through this trait.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a new reservation in `scheduled` state
    async fn create(&self, new: &NewReservation) -> Result<CallReservation, AppError>;

    /// Find a reservation by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<CallReservation>, AppError>;

    /// All reservations for a user, ordered by reservation date ascending
    async fn list_by_user(&self, username: &str) -> Result<Vec<CallReservation>, AppError>;

    /// Merge the supplied fields into the record and refresh `updated_at`.
    ///
    /// Returns `None` when no record with `id` exists. The merge is blind:
    /// last write wins per field group.
    async fn update(
        &self,
        id: i64,
        changes: &ReservationChanges,
    ) -> Result<Option<CallReservation>, AppError>;

    /// Ongoing reservations whose window closed before `today`/`now`
    async fn find_overdue_ongoing(
        &self,
        today: NaiveDate,
        now: NaiveTime,
    ) -> Result<Vec<CallReservation>, AppError>;

    /// Close out a single overdue reservation: `ongoing -> completed`,
    /// defaulting `call_duration` to 0 when unset.
    ///
    /// Conditional on the row still being `ongoing`; returns `None` when it
    /// already moved on, which keeps the sweep idempotent under races.
    async fn complete_expired(&self, id: i64) -> Result<Option<CallReservation>, AppError>;
}
