//! API request/response models for reservations, plus the availability check.

use crate::db::models::reservations::ReservationDBResponse;
use crate::types::{CatwayNumber, ReservationId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An inclusive date range `[start, end]`.
///
/// Bounds are inclusive on both sides for conflict purposes: a booking that
/// ends on a given day still occupies the berth that day, so another booking
/// starting the same day conflicts with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// A range is well-formed only when the start strictly precedes the end.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Two ranges overlap iff `s1 <= e2 && e1 >= s2`. Touching endpoints count
    /// as overlapping; the predicate is symmetric.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

/// Whether `candidate` conflicts with any of `existing` on the same berth.
///
/// When re-validating an update, the reservation's own stored range must be
/// excluded by its identity - never by value - so a reservation cannot
/// conflict with itself.
pub fn has_conflict<'a>(
    candidate: &DateRange,
    existing: impl IntoIterator<Item = (&'a ReservationId, &'a DateRange)>,
    exclude: Option<ReservationId>,
) -> bool {
    existing
        .into_iter()
        .filter(|(id, _)| Some(**id) != exclude)
        .any(|(_, range)| candidate.overlaps(range))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationCreate {
    pub client_name: String,
    pub boat_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial update: unset fields keep their stored values, even though the
/// route verb is PUT.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationUpdate {
    pub client_name: Option<String>,
    pub boat_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReservationUpdate {
    /// The date range the reservation would hold after this update: requested
    /// dates layered over the stored ones. The result still needs validating,
    /// since mixing one new bound with one stored bound can invert the range.
    pub fn merged_range(&self, stored: &DateRange) -> DateRange {
        DateRange {
            start: self.start_date.unwrap_or(stored.start),
            end: self.end_date.unwrap_or(stored.end),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ReservationId,
    pub catway_number: CatwayNumber,
    pub client_name: String,
    pub boat_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReservationDBResponse> for ReservationResponse {
    fn from(db: ReservationDBResponse) -> Self {
        Self {
            id: db.id,
            catway_number: db.catway_number,
            client_name: db.client_name,
            boat_name: db.boat_name,
            start_date: db.start_date,
            end_date: db.end_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange {
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
        }
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let cases = [
            (range("2024-01-10", "2024-01-15"), range("2024-01-12", "2024-01-20")),
            (range("2024-01-10", "2024-01-15"), range("2024-01-15", "2024-01-20")),
            (range("2024-01-10", "2024-01-15"), range("2024-01-16", "2024-01-20")),
            (range("2024-01-01", "2024-12-31"), range("2024-06-01", "2024-06-02")),
        ];

        for (a, b) in cases {
            assert_eq!(a.overlaps(&b), b.overlaps(&a), "symmetry violated for {a:?} / {b:?}");
        }
    }

    #[test]
    fn test_touching_endpoints_conflict() {
        let existing = range("2024-01-10", "2024-01-15");

        // Starting the day the other one ends is a conflict
        assert!(range("2024-01-15", "2024-01-20").overlaps(&existing));
        // Starting the day after is not
        assert!(!range("2024-01-16", "2024-01-20").overlaps(&existing));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = range("2024-01-01", "2024-01-31");
        let inner = range("2024-01-10", "2024-01-12");
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_validity() {
        assert!(range("2024-01-10", "2024-01-15").is_valid());
        assert!(!range("2024-01-15", "2024-01-15").is_valid());
        assert!(!range("2024-01-20", "2024-01-15").is_valid());
    }

    #[test]
    fn test_self_exclusion_by_identity() {
        let id = Uuid::new_v4();
        let stored = range("2024-01-10", "2024-01-15");

        // A reservation re-validated against the berth's bookings never
        // conflicts with itself when excluded by id...
        assert!(!has_conflict(&stored, [(&id, &stored)], Some(id)));

        // ...but an identical range under a different id still conflicts.
        let other_id = Uuid::new_v4();
        assert!(has_conflict(&stored, [(&other_id, &stored)], Some(id)));
    }

    #[test]
    fn test_merged_range_keeps_stored_dates_when_unset() {
        let stored = range("2024-01-10", "2024-01-15");
        let update = ReservationUpdate {
            client_name: Some("new client".to_string()),
            boat_name: None,
            start_date: None,
            end_date: None,
        };

        assert_eq!(update.merged_range(&stored), stored);
    }

    #[test]
    fn test_merged_range_layers_requested_dates() {
        let stored = range("2024-01-10", "2024-01-15");

        let update = ReservationUpdate {
            client_name: None,
            boat_name: None,
            start_date: Some("2024-01-12".parse().unwrap()),
            end_date: None,
        };
        assert_eq!(update.merged_range(&stored), range("2024-01-12", "2024-01-15"));

        let update = ReservationUpdate {
            client_name: None,
            boat_name: None,
            start_date: Some("2024-02-01".parse().unwrap()),
            end_date: Some("2024-02-05".parse().unwrap()),
        };
        assert_eq!(update.merged_range(&stored), range("2024-02-01", "2024-02-05"));
    }

    #[test]
    fn test_merged_range_can_invert_and_fails_validation() {
        // A new start past the stored end produces a range the caller must
        // reject.
        let stored = range("2024-01-10", "2024-01-15");
        let update = ReservationUpdate {
            client_name: None,
            boat_name: None,
            start_date: Some("2024-01-20".parse().unwrap()),
            end_date: None,
        };

        assert!(!update.merged_range(&stored).is_valid());
    }

    #[test]
    fn test_conflict_against_set() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let bookings = [(&a, &range("2024-01-01", "2024-01-05")), (&b, &range("2024-02-01", "2024-02-10"))];

        assert!(has_conflict(&range("2024-02-05", "2024-02-06"), bookings, None));
        assert!(!has_conflict(&range("2024-01-06", "2024-01-31"), bookings, None));
    }
}
