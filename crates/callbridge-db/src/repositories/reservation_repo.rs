//! Call reservation repository implementation
//!
//! Provides PostgreSQL-backed storage for call reservations. The update path
//! is a blind COALESCE merge (last write wins per field group), and the
//! expiry path is a per-row conditional update so a partially-swept batch is
//! completed by the next sweep.

use async_trait::async_trait;
use callbridge_core::{
    models::{CallReservation, NewReservation, ReservationChanges, ReservationStatus},
    traits::ReservationRepository,
    AppError, AppResult,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};

const RESERVATION_COLUMNS: &str = r#"
    id, username, reservation_date, start_time, end_time,
    status, phone_number, call_sid, call_duration,
    created_at, updated_at
"#;

/// PostgreSQL implementation of ReservationRepository
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new reservation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse reservation status from string
    fn parse_status(s: &str) -> ReservationStatus {
        ReservationStatus::from_str(s).unwrap_or_else(|| {
            warn!("Unknown reservation status '{}' in storage, treating as scheduled", s);
            ReservationStatus::Scheduled
        })
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self, new))]
    async fn create(&self, new: &NewReservation) -> AppResult<CallReservation> {
        debug!("Creating reservation for user: {}", new.username);

        let row = sqlx::query_as::<sqlx::Postgres, ReservationRow>(
            r#"
            INSERT INTO call_reservations (
                username, reservation_date, start_time, end_time,
                status, phone_number
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, username, reservation_date, start_time, end_time,
                status, phone_number, call_sid, call_duration,
                created_at, updated_at
            "#,
        )
        .bind(&new.username)
        .bind(new.reservation_date)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(ReservationStatus::Scheduled.to_string())
        .bind(&new.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating reservation: {}", e);
            AppError::Database(format!("Failed to create reservation: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AppResult<Option<CallReservation>> {
        debug!("Finding reservation by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&format!(
            "SELECT {} FROM call_reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding reservation {}: {}", id, e);
            AppError::Database(format!("Failed to find reservation: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, username: &str) -> AppResult<Vec<CallReservation>> {
        debug!("Listing reservations for user: {}", username);

        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&format!(
            r#"
            SELECT {}
            FROM call_reservations
            WHERE username = $1
            ORDER BY reservation_date ASC
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing reservations for {}: {}", username, e);
            AppError::Database(format!("Failed to list reservations: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: i64,
        changes: &ReservationChanges,
    ) -> AppResult<Option<CallReservation>> {
        debug!("Updating reservation: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, ReservationRow>(
            r#"
            UPDATE call_reservations
            SET username = COALESCE($2, username),
                reservation_date = COALESCE($3, reservation_date),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                status = COALESCE($6, status),
                phone_number = COALESCE($7, phone_number),
                call_sid = COALESCE($8, call_sid),
                call_duration = COALESCE($9, call_duration),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, username, reservation_date, start_time, end_time,
                status, phone_number, call_sid, call_duration,
                created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(changes.reservation_date)
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(changes.status.map(|s| s.to_string()))
        .bind(&changes.phone_number)
        .bind(&changes.call_sid)
        .bind(changes.call_duration)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating reservation {}: {}", id, e);
            AppError::Database(format!("Failed to update reservation: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_overdue_ongoing(
        &self,
        today: NaiveDate,
        now: NaiveTime,
    ) -> AppResult<Vec<CallReservation>> {
        debug!("Finding ongoing reservations overdue at {} {}", today, now);

        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&format!(
            r#"
            SELECT {}
            FROM call_reservations
            WHERE status = 'ongoing'
                AND (reservation_date < $1
                     OR (reservation_date = $1 AND end_time < $2))
            ORDER BY reservation_date ASC
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(today)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding overdue reservations: {}", e);
            AppError::Database(format!("Failed to find overdue reservations: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn complete_expired(&self, id: i64) -> AppResult<Option<CallReservation>> {
        debug!("Completing expired reservation: {}", id);

        // Conditional on status so a concurrent sweep or update wins cleanly
        let row = sqlx::query_as::<sqlx::Postgres, ReservationRow>(
            r#"
            UPDATE call_reservations
            SET status = 'completed',
                call_duration = COALESCE(call_duration, 0),
                updated_at = NOW()
            WHERE id = $1 AND status = 'ongoing'
            RETURNING
                id, username, reservation_date, start_time, end_time,
                status, phone_number, call_sid, call_duration,
                created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error completing reservation {}: {}", id, e);
            AppError::Database(format!("Failed to complete reservation: {}", e))
        })?;

        Ok(row.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    username: String,
    reservation_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    status: String,
    phone_number: Option<String>,
    call_sid: Option<String>,
    call_duration: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReservationRow> for CallReservation {
    fn from(row: ReservationRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            reservation_date: row.reservation_date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: PgReservationRepository::parse_status(&row.status),
            phone_number: row.phone_number,
            call_sid: row.call_sid,
            call_duration: row.call_duration,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
