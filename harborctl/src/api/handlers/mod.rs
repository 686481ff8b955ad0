//! HTTP request handlers.

pub mod auth;
pub mod catways;
pub mod reservations;
pub mod users;
