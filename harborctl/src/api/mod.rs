//! REST API surface: request/response models and handlers.

pub mod extract;
pub mod handlers;
pub mod models;
