//! Database layer: errors, record models, and repositories.

pub mod errors;
pub mod handlers;
pub mod models;
