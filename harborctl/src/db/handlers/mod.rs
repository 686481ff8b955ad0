//! Table-specific repositories built on the [`Repository`](repository::Repository) trait.

pub mod catways;
pub mod repository;
pub mod reservations;
pub mod users;
