//! Request/response data structures for API communication.

pub mod auth;
pub mod catways;
pub mod reservations;
pub mod users;
