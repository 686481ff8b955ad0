//! Database record structures matching table schemas.

pub mod catways;
pub mod reservations;
pub mod users;
