//! Domain models for CallBridge
//!
//! This module contains all the core domain models used throughout the application.

pub mod reservation;
pub mod routing;

pub use reservation::{CallReservation, NewReservation, ReservationChanges, ReservationStatus};
pub use routing::{
    CallEvent, CallOutcome, ConnectionInstruction, RoutingDecision, SpokenMessage, StatusCallback,
    TargetKind, STATUS_CALLBACK_EVENTS,
};
