//! Reservation handlers
//!
//! HTTP handlers for the reservation lifecycle endpoints. Handlers stay thin:
//! parsing and state-machine rules live in the lifecycle manager.

use crate::dto::{
    ApiResponse, ReservationCreateRequest, ReservationResponse, ReservationUpdateRequest,
    SweepResponse,
};
use actix_web::{web, HttpResponse};
use callbridge_core::AppError;
use callbridge_db::PgReservationRepository;
use callbridge_services::ReservationLifecycle;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use validator::Validate;

fn lifecycle(pool: &web::Data<PgPool>) -> ReservationLifecycle<PgReservationRepository> {
    ReservationLifecycle::new(Arc::new(PgReservationRepository::new(
        pool.get_ref().clone(),
    )))
}

/// Create a new reservation
///
/// POST /api/v1/reservations
#[instrument(skip(pool, req))]
pub async fn create_reservation(
    pool: web::Data<PgPool>,
    req: web::Json<ReservationCreateRequest>,
) -> Result<HttpResponse, AppError> {
    debug!(username = %req.username, "Creating reservation");

    let created = lifecycle(&pool).create(req.into_inner().into()).await?;

    let response = ReservationResponse::from(created);
    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        response,
        "Reservation created successfully",
    )))
}

/// List all reservations for a user, ordered by date
///
/// GET /api/v1/reservations/user/{username}
#[instrument(skip(pool))]
pub async fn list_user_reservations(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    debug!(%username, "Listing reservations");

    let reservations = lifecycle(&pool).list_by_user(&username).await?;

    let response: Vec<ReservationResponse> = reservations.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Get a single reservation by ID
///
/// GET /api/v1/reservations/{id}
#[instrument(skip(pool))]
pub async fn get_reservation(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let raw_id = path.into_inner();
    debug!(id = %raw_id, "Getting reservation");

    let reservation = lifecycle(&pool).get(&raw_id).await?;

    let response = ReservationResponse::from(reservation);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Merge a partial update into a reservation
///
/// PUT /api/v1/reservations/{id}
#[instrument(skip(pool, req))]
pub async fn update_reservation(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    req: web::Json<ReservationUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Reservation update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let raw_id = path.into_inner();
    debug!(id = %raw_id, "Updating reservation");

    let updated = lifecycle(&pool)
        .update(&raw_id, req.into_inner().into())
        .await?;

    let response = ReservationResponse::from(updated);
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        response,
        "Reservation updated successfully",
    )))
}

/// Complete every ongoing reservation whose window has elapsed
///
/// POST /api/v1/reservations/sweep
#[instrument(skip(pool))]
pub async fn sweep_expired_reservations(
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    debug!("Running reservation expiry sweep");

    let outcome = lifecycle(&pool).sweep_expired().await?;

    let response = SweepResponse::from(outcome);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Configure reservation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reservations")
            .route("", web::post().to(create_reservation))
            .route("/sweep", web::post().to(sweep_expired_reservations))
            .route("/user/{username}", web::get().to(list_user_reservations))
            .route("/{id}", web::get().to(get_reservation))
            .route("/{id}", web::put().to(update_reservation)),
    );
}
