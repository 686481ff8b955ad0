//! API request/response models for catways (berths).

use crate::db::models::catways::CatwayDBResponse;
use crate::types::CatwayNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Berth type. Long berths take larger boats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "catway_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CatwayType {
    Long,
    Short,
}

impl CatwayType {
    /// Derive the type of a lazily provisioned berth from its number: berths
    /// numbered at or above the threshold are long, the rest short.
    pub fn for_number(number: CatwayNumber, long_type_threshold: CatwayNumber) -> Self {
        if number >= long_type_threshold { CatwayType::Long } else { CatwayType::Short }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatwayCreate {
    pub number: CatwayNumber,
    #[serde(rename = "type")]
    pub catway_type: CatwayType,
    pub state: String,
}

/// Only the free-text state can change; number and type are immutable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatwayStateUpdate {
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatwayResponse {
    pub number: CatwayNumber,
    #[serde(rename = "type")]
    pub catway_type: CatwayType,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatwayDBResponse> for CatwayResponse {
    fn from(db: CatwayDBResponse) -> Self {
        Self {
            number: db.number,
            catway_type: db.catway_type,
            state: db.state,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_derivation_threshold() {
        // Default harbor rule: >= 15 is long, below is short
        assert_eq!(CatwayType::for_number(3, 15), CatwayType::Short);
        assert_eq!(CatwayType::for_number(14, 15), CatwayType::Short);
        assert_eq!(CatwayType::for_number(15, 15), CatwayType::Long);
        assert_eq!(CatwayType::for_number(24, 15), CatwayType::Long);
    }

    #[test]
    fn test_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CatwayType::Long).unwrap(), "\"long\"");
        assert_eq!(serde_json::to_string(&CatwayType::Short).unwrap(), "\"short\"");
    }
}
