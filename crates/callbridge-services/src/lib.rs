//! Business logic services for CallBridge
//!
//! This crate contains the decision logic of the system:
//!
//! - `routing` - destination classification, caller-identity resolution, and
//!   the call router that turns call events into connection instructions
//! - `lifecycle` - the reservation state machine and expiry sweep
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - The router is a pure function of the call event and injected config
//! - The lifecycle manager works against the `ReservationRepository` trait
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError

pub mod lifecycle;
pub mod routing;

pub use lifecycle::{
    CreateReservationInput, ReservationLifecycle, SweepOutcome, UpdateReservationInput,
};
pub use routing::{classify_destination, CallRouter, CallerIdResolution};

/// Business logic constants
pub mod constants {
    /// Caller identity assumed when the provider sends no From value
    pub const ANONYMOUS_CALLER: &str = "client:anonymous";

    /// Prefix marking an internal client identity
    pub const CLIENT_PREFIX: &str = "client:";

    /// Prefix marking a SIP URI destination
    pub const SIP_PREFIX: &str = "sip:";

    /// Fallback message when an outbound call names no destination
    pub const NO_DESTINATION_MESSAGE: &str = "No destination specified.";

    /// Fallback message when an inbound call cannot be routed to a client
    pub const NO_ONE_AVAILABLE_MESSAGE: &str =
        "No one is available to take your call at the moment. Please try again later.";

    /// Date format accepted for reservation dates
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Time formats accepted for reservation windows
    pub const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
}
