//! Database models for catways.

use crate::api::models::catways::{CatwayCreate, CatwayType};
use crate::types::CatwayNumber;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a catway
#[derive(Debug, Clone)]
pub struct CatwayCreateDBRequest {
    pub number: CatwayNumber,
    pub catway_type: CatwayType,
    pub state: String,
}

impl From<CatwayCreate> for CatwayCreateDBRequest {
    fn from(api: CatwayCreate) -> Self {
        Self {
            number: api.number,
            catway_type: api.catway_type,
            state: api.state,
        }
    }
}

/// Database request for updating a catway. Only the state is mutable.
#[derive(Debug, Clone)]
pub struct CatwayUpdateDBRequest {
    pub state: String,
}

/// Database response for a catway
#[derive(Debug, Clone, FromRow)]
pub struct CatwayDBResponse {
    pub number: CatwayNumber,
    pub catway_type: CatwayType,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
