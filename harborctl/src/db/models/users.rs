//! Database models for users.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    /// Already lowercased by the API layer.
    pub email: String,
    pub password_hash: String,
}

/// Database request for updating a user. `None` fields are left unchanged.
#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

/// Database response for a user
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
