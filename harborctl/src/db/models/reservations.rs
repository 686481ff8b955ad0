//! Database models for reservations.

use crate::types::{CatwayNumber, ReservationId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database request for creating a reservation
#[derive(Debug, Clone)]
pub struct ReservationCreateDBRequest {
    pub catway_number: CatwayNumber,
    pub client_name: String,
    pub boat_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Database request for updating a reservation. `None` fields are left unchanged.
#[derive(Debug, Clone)]
pub struct ReservationUpdateDBRequest {
    pub client_name: Option<String>,
    pub boat_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Database response for a reservation
#[derive(Debug, Clone, FromRow)]
pub struct ReservationDBResponse {
    pub id: ReservationId,
    pub catway_number: CatwayNumber,
    pub client_name: String,
    pub boat_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
