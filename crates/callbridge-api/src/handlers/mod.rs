//! HTTP request handlers

pub mod reservation;
pub mod voice;

pub use reservation::configure as configure_reservations;
pub use voice::configure as configure_voice;
