//! Request and response DTOs

pub mod common;
pub mod reservation;
pub mod voice;

pub use common::ApiResponse;
pub use reservation::{
    ReservationCreateRequest, ReservationResponse, ReservationUpdateRequest, SweepResponse,
};
pub use voice::{StatusCallbackRequest, VoiceRequest};
