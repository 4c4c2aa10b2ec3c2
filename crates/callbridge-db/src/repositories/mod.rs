//! Repository implementations

pub mod reservation_repo;

pub use reservation_repo::PgReservationRepository;
