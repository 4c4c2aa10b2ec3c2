//! CallBridge Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the CallBridge system. It includes:
//!
//! - Connection pool management with sqlx
//! - The reservation repository backing the lifecycle manager

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use callbridge_core::{AppError, AppResult};
pub use sqlx::PgPool;
