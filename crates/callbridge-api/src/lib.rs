//! API layer for CallBridge
//!
//! HTTP handlers for call routing webhooks and reservation management,
//! plus the call-control document rendering consumed by the telephony
//! provider.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs
)]

pub mod dto;
pub mod handlers;
pub mod twiml;

// Re-export DTOs (common types)
pub use dto::ApiResponse;

// Re-export handler configuration functions
pub use handlers::{configure_reservations, configure_voice};
